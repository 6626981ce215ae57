pub mod info;
pub mod scan;

use std::fmt;

use clap::{ArgAction, Args, Parser, Subcommand};
use sweepr_common::config::{DEFAULT_CONCURRENCY, DEFAULT_PORT, DEFAULT_TIMEOUT};

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(version, about = "Sweeps a network block for open TCP ports.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output (-q drops banners and headers, -qq prints only active hosts)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show hostname, local IP and LAN network of this device
    #[command(alias = "i")]
    Info,
    /// Probe every host of a CIDR block
    #[command(alias = "s")]
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// CIDR block (e.g. 192.168.1.0/24), single address, or "lan" [default: lan]
    pub target: Option<String>,

    /// Ports to probe, e.g. "22,80,8000-8010"
    #[arg(short, long, value_parser = parse_ports, default_value_t = PortList(vec![DEFAULT_PORT]))]
    pub ports: PortList,

    /// Per-probe timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout: u64,

    /// Maximum number of probes in flight
    #[arg(short, long, value_parser = parse_concurrency, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parsed `--ports` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortList(pub Vec<u16>);

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(u16::to_string).collect();
        f.write_str(&joined.join(","))
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Parses a comma separated list of ports and inclusive ranges.
pub fn parse_ports(s: &str) -> Result<PortList, String> {
    let mut ports: Vec<u16> = Vec::new();

    for part in s.split(',') {
        let part: &str = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.split_once('-') {
            Some((start, end)) => {
                let start: u16 = parse_port(start)?;
                let end: u16 = parse_port(end)?;
                if start > end {
                    return Err(format!("port range '{part}' is reversed"));
                }
                ports.extend(start..=end);
            }
            None => ports.push(parse_port(part)?),
        }
    }

    if ports.is_empty() {
        return Err("no ports given".to_string());
    }
    Ok(PortList(ports))
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid concurrency '{s}': {e}")),
    }
}

fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .trim()
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{s}': {e}"))?;
    if port == 0 {
        return Err("port 0 cannot be probed".to_string());
    }
    Ok(port)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
