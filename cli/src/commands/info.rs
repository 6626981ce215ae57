use std::env;

use colored::*;
use sweepr_common::config::Config;
use sweepr_common::network::interface;
use sweepr_common::network::range::AddressRange;
use sweepr_common::warn;

use crate::mprint;
use crate::terminal::{colors, print};

const KEY_WIDTH: usize = 10;

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    if cfg.quiet == 0 {
        mprint!(&format!(
            "{}",
            "Sweepr probes every host of a network block for open TCP ports."
                .truecolor(192, 192, 192)
        ));
        mprint!();
    }

    print_about_the_tool(cfg.quiet);
    print_local_system(cfg.quiet)?;
    print_local_network(cfg.quiet);
    Ok(())
}

fn print_about_the_tool(q_level: u8) {
    if q_level > 0 {
        return;
    }
    print::aligned_line("Version", env!("CARGO_PKG_VERSION"), KEY_WIDTH);
    print::aligned_line("License", "MIT", KEY_WIDTH);
}

fn print_local_system(q_level: u8) -> anyhow::Result<()> {
    print::header("local system", q_level);
    let hostname: String = sys_info::hostname()?;
    print::aligned_line("Hostname", hostname.color(colors::ACCENT), KEY_WIDTH);

    let release: String = sys_info::os_release().unwrap_or_default();
    if let Ok(os_name) = sys_info::os_type() {
        print::aligned_line("OS", format!("{os_name} {release}"), KEY_WIDTH);
    }
    if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        print::aligned_line("User", user, KEY_WIDTH);
    }
    Ok(())
}

fn print_local_network(q_level: u8) {
    print::header("local network", q_level);

    match interface::get_local_ip() {
        Ok(ip) => print::aligned_line("Local IP", print::color_ip(ip), KEY_WIDTH),
        Err(e) => warn!("Could not determine the local IP: {e}"),
    }

    match interface::get_lan_range() {
        Ok(range) => {
            print::aligned_line("Network", range.to_string().color(colors::PRIMARY), KEY_WIDTH);
            print::aligned_line("Hosts", range.len(), KEY_WIDTH);
            print_host_span(&range);
        }
        Err(e) => warn!("Could not determine the LAN network: {e}"),
    }
}

fn print_host_span(range: &AddressRange) {
    let span: String = format!(
        "{} {} {}",
        print::color_ip(range.first_host()),
        "-".color(colors::SEPARATOR),
        print::color_ip(range.last_host())
    );
    print::aligned_line("Range", span, KEY_WIDTH);
}
