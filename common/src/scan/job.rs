//! # Scan Job
//!
//! The fixed set of [`ProbeTarget`]s for one invocation: every usable host of
//! an [`AddressRange`] crossed with a port list.

use crate::config::DEFAULT_PORT;
use crate::network::range::AddressRange;
use crate::network::target::ProbeTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    range: AddressRange,
    ports: Vec<u16>,
}

impl ScanJob {
    /// Builds a job over `range`. Ports are sorted and de-duplicated; an
    /// empty list falls back to [`DEFAULT_PORT`].
    pub fn new<I>(range: AddressRange, ports: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let mut ports: Vec<u16> = ports.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();
        if ports.is_empty() {
            ports.push(DEFAULT_PORT);
        }
        Self { range, ports }
    }

    pub fn range(&self) -> &AddressRange {
        &self.range
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Number of targets, saturating for absurdly large IPv6 blocks.
    pub fn len(&self) -> u128 {
        self.range.len().saturating_mul(self.ports.len() as u128)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `target` is part of this job.
    pub fn contains(&self, target: &ProbeTarget) -> bool {
        self.ports.binary_search(&target.port).is_ok()
            && self.range.contains(target.address)
            && self.range.first_host() <= target.address
            && target.address <= self.range.last_host()
    }

    /// Lazily yields targets in address-then-port order.
    pub fn targets(&self) -> impl Iterator<Item = ProbeTarget> + '_ {
        self.range.hosts().flat_map(move |address| {
            self.ports
                .iter()
                .map(move |&port| ProbeTarget::new(address, port))
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn target(d: u8, port: u16) -> ProbeTarget {
        ProbeTarget::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, d)), port)
    }

    #[test]
    fn empty_port_list_defaults_to_port_80() {
        let range = AddressRange::expand("10.0.0.0/30").unwrap();
        let job = ScanJob::new(range, Vec::new());
        assert_eq!(job.ports(), &[DEFAULT_PORT]);
        assert_eq!(job.len(), 2);
    }

    #[test]
    fn targets_are_address_then_port_ordered() {
        let range = AddressRange::expand("10.0.0.0/30").unwrap();
        let job = ScanJob::new(range, [443, 22, 443, 80]);

        let targets: Vec<ProbeTarget> = job.targets().collect();
        assert_eq!(
            targets,
            vec![
                target(1, 22),
                target(1, 80),
                target(1, 443),
                target(2, 22),
                target(2, 80),
                target(2, 443),
            ]
        );
        assert_eq!(job.len(), targets.len() as u128);
    }

    #[test]
    fn contains_excludes_network_broadcast_and_foreign_ports() {
        let range = AddressRange::expand("10.0.0.0/30").unwrap();
        let job = ScanJob::new(range, [22]);

        assert!(job.contains(&target(1, 22)));
        assert!(job.contains(&target(2, 22)));
        assert!(!job.contains(&target(0, 22)));
        assert!(!job.contains(&target(3, 22)));
        assert!(!job.contains(&target(1, 80)));
    }
}
