#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::config::ScanConfig;
use sweepr_common::network::range::AddressRange;
use sweepr_common::network::target::ProbeTarget;
use sweepr_common::scan::job::ScanJob;
use sweepr_common::scan::outcome::ProbeOutcome;
use sweepr_common::scan::report::ScanReport;
use sweepr_core::scanner::{self, Prober, Scanner};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn loopback_config(ports: Vec<u16>) -> ScanConfig {
    ScanConfig {
        ports,
        timeout: Duration::from_millis(500),
        concurrency: 16,
    }
}

/// Binds a listener and returns it with a second port that nothing listens on.
async fn open_and_closed_port() -> (TcpListener, u16, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let open: u16 = listener.local_addr().unwrap().port();

    let released = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let closed: u16 = released.local_addr().unwrap().port();
    drop(released);

    (listener, open, closed)
}

#[tokio::test]
async fn scan_single_loopback_host() {
    let (_listener, open, closed) = open_and_closed_port().await;
    let range: AddressRange = AddressRange::expand("127.0.0.1/32").unwrap();
    let cfg: ScanConfig = loopback_config(vec![open, closed]);
    let job = ScanJob::new(range, cfg.ports.clone());

    let report: ScanReport =
        scanner::perform_scan(&job, &cfg, CancellationToken::new(), None).await;

    assert_eq!(report.len(), 2);
    assert!(!report.is_partial());
    assert_eq!(
        report.outcome(&ProbeTarget::new(LOCALHOST, open)),
        Some(&ProbeOutcome::Open)
    );
    assert_eq!(
        report.outcome(&ProbeTarget::new(LOCALHOST, closed)),
        Some(&ProbeOutcome::Closed)
    );
    assert_eq!(report.active_hosts(), vec![LOCALHOST]);
    assert_eq!(report.open_ports(LOCALHOST), vec![open]);
}

/// Every 127/8 address is local on Linux, so the whole /30 answers.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn scan_loopback_block() {
    let (_listener, open, _) = open_and_closed_port().await;
    let range: AddressRange = AddressRange::expand("127.0.0.0/30").unwrap();
    let cfg: ScanConfig = loopback_config(vec![open]);
    let job = ScanJob::new(range, [open]);

    let report: ScanReport =
        scanner::perform_scan(&job, &cfg, CancellationToken::new(), None).await;

    let probed: Vec<IpAddr> = report.entries().iter().map(|e| e.target.address).collect();
    assert_eq!(
        probed,
        vec![
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)),
        ]
    );
    assert_eq!(report.active_hosts(), vec![LOCALHOST]);
    assert_eq!(report.summary().open, 1);
    assert_eq!(report.summary().closed, 1);
}

#[tokio::test]
async fn cancelled_scan_reports_partial_results() {
    let range: AddressRange = AddressRange::expand("10.0.0.0/24").unwrap();
    let cfg: ScanConfig = loopback_config(vec![80]);
    let job = ScanJob::new(range, [80]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report: ScanReport = scanner::perform_scan(&job, &cfg, cancel, None).await;

    assert!(report.is_partial());
    assert!(report.is_empty());
    assert_eq!(report.job_size(), 254);
}

/// Answers "open" for one socket address and "filtered" for everything else.
struct OneOpenPort(SocketAddr);

#[async_trait]
impl Prober for OneOpenPort {
    async fn probe(&self, target: ProbeTarget, _timeout: Duration) -> ProbeOutcome {
        if target.socket_addr() == self.0 {
            ProbeOutcome::Open
        } else {
            ProbeOutcome::Filtered
        }
    }
}

#[tokio::test]
async fn custom_prober_sweeps_ipv6_block() {
    let range: AddressRange = AddressRange::expand("2001:db8::/120").unwrap();
    let open: SocketAddr = "[2001:db8::2a]:443".parse().unwrap();
    let job = ScanJob::new(range, [22, 443]);

    let report: ScanReport = Scanner::new(OneOpenPort(open))
        .scan(&job, 32, Duration::from_millis(10))
        .await;

    // ::/120 minus the subnet-router anycast address, two ports each.
    assert_eq!(report.len(), 255 * 2);
    assert_eq!(report.summary().open, 1);
    assert_eq!(report.active_hosts(), vec![open.ip()]);
}
