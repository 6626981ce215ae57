use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Context;
use colored::*;
use sweepr_common::config::{Config, ScanConfig};
use sweepr_common::network::interface;
use sweepr_common::network::range::AddressRange;
use sweepr_common::network::target::ProbeTarget;
use sweepr_common::scan::job::ScanJob;
use sweepr_common::scan::outcome::ProbeOutcome;
use sweepr_common::scan::report::ScanReport;
use sweepr_common::{error, info, success};
use sweepr_core::scanner::{self, ProgressFn};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info_span};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, print, spinner};

type Detail = (String, ColoredString);

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let range: AddressRange = resolve_target(args.target.as_deref())?;
    let scan_cfg = ScanConfig {
        ports: args.ports.0,
        timeout: Duration::from_millis(args.timeout),
        concurrency: args.concurrency,
    };
    let job = ScanJob::new(range, scan_cfg.ports.iter().copied());

    if cfg.quiet == 0 {
        info!(
            "Scanning network: {} ({} hosts, {} ports)",
            range.to_string().color(colors::PRIMARY),
            range.len(),
            job.ports().len()
        );
    }

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let input: Option<InputHandle> = if cfg.json {
        None
    } else {
        InputHandle::start(cancel.clone())
    };

    let span: Span = if cfg.json {
        Span::none()
    } else {
        info_span!("scan", indicatif.pb_show = true)
    };
    spinner::start_scan_progress(&span, job.len());

    let open = Arc::new(AtomicUsize::new(0));
    let progress_span: Span = span.clone();
    let on_outcome: Box<ProgressFn> =
        Box::new(move |_: &ProbeTarget, outcome: &ProbeOutcome, _: usize| {
            let count: usize = if outcome.is_open() {
                open.fetch_add(1, Ordering::Relaxed) + 1
            } else {
                open.load(Ordering::Relaxed)
            };
            spinner::report_scan_progress(&progress_span, count);
        });

    let report: ScanReport = scanner::perform_scan(&job, &scan_cfg, cancel, Some(on_outcome))
        .instrument(span)
        .await;

    drop(input);
    ctrl_c.abort();

    if cfg.json {
        let rendered: String =
            serde_json::to_string_pretty(&report).context("failed to serialize scan report")?;
        println!("{rendered}");
        return Ok(());
    }

    scan_ends(&report, cfg);
    Ok(())
}

/// No target or "lan" means the network of the best local interface.
fn resolve_target(target: Option<&str>) -> anyhow::Result<AddressRange> {
    match target {
        None => interface::get_lan_range().context("no target given and LAN detection failed"),
        Some(t) if t.eq_ignore_ascii_case("lan") => {
            interface::get_lan_range().context("LAN detection failed")
        }
        Some(t) => Ok(AddressRange::expand(t)?),
    }
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancel.cancel();
    }
}

fn scan_ends(report: &ScanReport, cfg: &Config) {
    let hosts: Vec<IpAddr> = report.active_hosts();
    if hosts.is_empty() {
        print::header("zero active hosts", cfg.quiet);
        if cfg.quiet == 0 {
            print::no_results();
        }
    } else {
        print::header("scan results", cfg.quiet);
        print_hosts(report, &hosts, cfg);
    }

    print_errors(report);
    print_summary(report, hosts.len(), cfg);
}

fn print_hosts(report: &ScanReport, hosts: &[IpAddr], cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        success!("Active device found: {}", print::color_ip(*host));
        if cfg.quiet == 0 {
            print::as_tree_one_level(&port_details(report, *host));
            if idx + 1 != hosts.len() {
                mprint!();
            }
        }
    }
}

fn port_details(report: &ScanReport, host: IpAddr) -> Vec<Detail> {
    report
        .open_ports(host)
        .into_iter()
        .map(|port| {
            (
                format!("{port}/tcp"),
                ProbeOutcome::Open.label().color(colors::OPEN),
            )
        })
        .collect()
}

fn print_errors(report: &ScanReport) {
    for entry in report.entries() {
        if let ProbeOutcome::Error(reason) = &entry.outcome {
            error!("Error scanning {}: {}", entry.target, reason);
        }
    }
}

fn print_summary(report: &ScanReport, hosts_len: usize, cfg: &Config) {
    let summary = report.summary();
    let active_hosts: ColoredString = format!("{hosts_len} active hosts").bold().green();
    let open: ColoredString = format!("{} open", summary.open).color(colors::OPEN);
    let closed: ColoredString = format!("{} closed", summary.closed).color(colors::CLOSED);
    let filtered: ColoredString = format!("{} filtered", summary.filtered).color(colors::FILTERED);
    let total_time: ColoredString = format!("{:.2}s", report.elapsed().as_secs_f64())
        .bold()
        .yellow();
    let status: String = if report.is_partial() {
        format!("Scan Interrupted ({}/{} probes)", report.len(), report.job_size())
    } else {
        "Scan Complete".to_string()
    };

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&format!("{open}, {closed}, {filtered}"));
            print::centerln(
                &format!("{status}: {active_hosts} identified in {total_time}")
                    .color(colors::TEXT_DEFAULT)
                    .to_string(),
            );
        }
        1 => {
            mprint!();
            success!("{status}: {active_hosts} identified in {total_time}");
        }
        _ => {}
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
