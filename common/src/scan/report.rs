//! # Scan Report
//!
//! The frozen result of a scan: one [`ScanEntry`] per probed target, sorted
//! by address then port, plus summary counts.
//!
//! A report is assembled once by the coordinator through
//! [`ScanReport::freeze`] and is read-only afterwards. How it is rendered
//! (text, JSON) is up to the caller; the type only implements `Serialize`.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::network::target::ProbeTarget;
use crate::scan::outcome::ProbeOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub target: ProbeTarget,
    pub outcome: ProbeOutcome,
}

/// Outcome counts per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    pub error: usize,
}

impl Summary {
    fn tally(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Open => self.open += 1,
            ProbeOutcome::Closed => self.closed += 1,
            ProbeOutcome::Filtered => self.filtered += 1,
            ProbeOutcome::Error(_) => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.open + self.closed + self.filtered + self.error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    entries: Vec<ScanEntry>,
    summary: Summary,
    partial: bool,
    job_size: u128,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    elapsed: Duration,
}

impl ScanReport {
    /// Freezes recorded outcomes into a report.
    ///
    /// `job_size` is the number of targets the scan was asked to cover and
    /// `partial` marks a scan that was cancelled before covering them all.
    pub fn freeze<I>(outcomes: I, job_size: u128, partial: bool, elapsed: Duration) -> Self
    where
        I: IntoIterator<Item = (ProbeTarget, ProbeOutcome)>,
    {
        let mut entries: Vec<ScanEntry> = outcomes
            .into_iter()
            .map(|(target, outcome)| ScanEntry { target, outcome })
            .collect();
        entries.sort_by_key(|entry| entry.target);

        let mut summary = Summary::default();
        for entry in &entries {
            summary.tally(&entry.outcome);
        }

        Self {
            entries,
            summary,
            partial,
            job_size,
            elapsed,
        }
    }

    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// `true` when the scan was cancelled before every target was probed.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn job_size(&self) -> u128 {
        self.job_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn outcome(&self, target: &ProbeTarget) -> Option<&ProbeOutcome> {
        self.entries
            .binary_search_by_key(target, |entry| entry.target)
            .ok()
            .map(|idx| &self.entries[idx].outcome)
    }

    /// Distinct addresses with at least one open port, in address order.
    pub fn active_hosts(&self) -> Vec<IpAddr> {
        let mut hosts: Vec<IpAddr> = self
            .entries
            .iter()
            .filter(|entry| entry.outcome.is_open())
            .map(|entry| entry.target.address)
            .collect();
        hosts.dedup();
        hosts
    }

    /// Open ports found on `address`, ascending.
    pub fn open_ports(&self, address: IpAddr) -> Vec<u16> {
        self.entries
            .iter()
            .filter(|entry| entry.target.address == address && entry.outcome.is_open())
            .map(|entry| entry.target.port)
            .collect()
    }
}

fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn target(d: u8, port: u16) -> ProbeTarget {
        ProbeTarget::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, d)), port)
    }

    fn sample() -> ScanReport {
        ScanReport::freeze(
            vec![
                (target(2, 80), ProbeOutcome::Closed),
                (target(9, 22), ProbeOutcome::Error("network unreachable".into())),
                (target(1, 443), ProbeOutcome::Open),
                (target(1, 22), ProbeOutcome::Open),
                (target(3, 80), ProbeOutcome::Filtered),
            ],
            5,
            false,
            Duration::from_millis(1234),
        )
    }

    #[test]
    fn freeze_sorts_by_address_then_port() {
        let report = sample();
        let order: Vec<ProbeTarget> = report.entries().iter().map(|e| e.target).collect();
        assert_eq!(
            order,
            vec![target(1, 22), target(1, 443), target(2, 80), target(3, 80), target(9, 22)]
        );
    }

    #[test]
    fn summary_counts_each_outcome() {
        let report = sample();
        assert_eq!(
            report.summary(),
            Summary {
                open: 2,
                closed: 1,
                filtered: 1,
                error: 1
            }
        );
        assert_eq!(report.summary().total(), report.len());
    }

    #[test]
    fn active_hosts_are_distinct() {
        let report = sample();
        assert_eq!(report.active_hosts(), vec![target(1, 0).address]);
        assert_eq!(report.open_ports(target(1, 0).address), vec![22, 443]);
        assert!(report.open_ports(target(2, 0).address).is_empty());
    }

    #[test]
    fn outcome_lookup() {
        let report = sample();
        assert_eq!(report.outcome(&target(3, 80)), Some(&ProbeOutcome::Filtered));
        assert_eq!(report.outcome(&target(3, 81)), None);
    }

    #[test]
    fn serializes_to_json() {
        let report = ScanReport::freeze(
            vec![(target(1, 22), ProbeOutcome::Error("no route".into()))],
            2,
            true,
            Duration::from_millis(40),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["partial"], true);
        assert_eq!(json["job_size"], 2);
        assert_eq!(json["elapsed_ms"], 40);
        assert_eq!(json["summary"]["error"], 1);
        assert_eq!(json["entries"][0]["target"]["address"], "10.0.0.1");
        assert_eq!(json["entries"][0]["outcome"]["state"], "error");
        assert_eq!(json["entries"][0]["outcome"]["reason"], "no route");
    }
}
