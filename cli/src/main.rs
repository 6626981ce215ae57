mod commands;
mod terminal;

use commands::{CommandLine, Commands, info, scan};
use sweepr_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    let json: bool = matches!(&commands.command, Commands::Scan(args) if args.json);
    logging::init_logging(json);

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: if json { 2 } else { commands.quiet },
        json,
    };

    print::banner(cfg.no_banner, cfg.quiet);

    let result: anyhow::Result<()> = match commands.command {
        Commands::Info => {
            print::header("about this device", cfg.quiet);
            info::info(&cfg)
        }
        Commands::Scan(args) => {
            print::header("starting scanner", cfg.quiet);
            scan::scan(args, &cfg).await
        }
    };

    print::end_of_program(cfg.quiet);
    result
}
