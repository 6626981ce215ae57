//! # Address Range Model
//!
//! Turns CIDR notation (`192.168.1.0/24`, `fd00::/120`) into the sequence of
//! usable host addresses of that block.
//!
//! Host enumeration rules:
//! * IPv4 prefixes up to `/30` skip the network and broadcast addresses.
//! * IPv4 `/31` and `/32` yield every address in the block.
//! * IPv6 prefixes up to `/126` skip the subnet-router anycast address.
//! * IPv6 `/127` and `/128` yield every address in the block.
//!
//! Nothing is materialised up front. [`AddressRange::hosts`] returns a fresh
//! iterator on every call, so one range can be counted and scanned
//! independently.

use std::fmt;
use std::iter::FusedIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;

use crate::error::RangeError;

const IPV4_BITS: u8 = 32;
const IPV6_BITS: u8 = 128;

/// An immutable CIDR block and its usable host span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    network: IpNetwork,
    first_host: u128,
    last_host: u128,
}

impl AddressRange {
    /// Parses `cidr` into a range.
    ///
    /// A bare address is accepted as a single host block. Host bits below the
    /// prefix are masked off, so `10.0.0.77/24` denotes `10.0.0.0/24`.
    pub fn expand(cidr: &str) -> Result<Self, RangeError> {
        let trimmed: &str = cidr.trim();
        if trimmed.is_empty() {
            return Err(RangeError::invalid(cidr, "empty input"));
        }

        let (addr_str, prefix_str) = match trimmed.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (trimmed, None),
        };

        let addr: IpAddr = addr_str
            .parse::<IpAddr>()
            .map_err(|e| RangeError::invalid(cidr, format!("bad address '{addr_str}': {e}")))?;

        let max_prefix: u8 = match addr {
            IpAddr::V4(_) => IPV4_BITS,
            IpAddr::V6(_) => IPV6_BITS,
        };

        let prefix: u8 = match prefix_str {
            Some(p) => parse_prefix(p, max_prefix).map_err(|reason| RangeError::invalid(cidr, reason))?,
            None => max_prefix,
        };

        let (network_addr, _) = block_bounds(addr, prefix);
        let network = IpNetwork::new(network_addr, prefix)
            .map_err(|e| RangeError::invalid(cidr, e.to_string()))?;

        Ok(Self::from(network))
    }

    pub fn network(&self) -> IpAddr {
        self.network.ip()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn is_ipv4(&self) -> bool {
        self.network.ip().is_ipv4()
    }

    /// Exact number of usable hosts, computed without iterating.
    pub fn len(&self) -> u128 {
        self.last_host - self.first_host + 1
    }

    /// A block always holds at least one usable host.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `addr` lies inside the declared block (network and broadcast included).
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.network.contains(addr)
    }

    pub fn first_host(&self) -> IpAddr {
        to_addr(self.first_host, self.is_ipv4())
    }

    pub fn last_host(&self) -> IpAddr {
        to_addr(self.last_host, self.is_ipv4())
    }

    /// Lazily walks the usable hosts in ascending order.
    pub fn hosts(&self) -> HostIter {
        HostIter {
            front: self.first_host,
            back: self.last_host,
            exhausted: false,
            is_ipv4: self.is_ipv4(),
        }
    }
}

impl From<IpNetwork> for AddressRange {
    fn from(net: IpNetwork) -> Self {
        let prefix: u8 = net.prefix();
        let (network_addr, broadcast_addr) = block_bounds(net.ip(), prefix);
        let network_u128: u128 = to_u128(network_addr);
        let broadcast_u128: u128 = to_u128(broadcast_addr);

        let (first_host, last_host) = match network_addr {
            IpAddr::V4(_) if prefix <= IPV4_BITS - 2 => (network_u128 + 1, broadcast_u128 - 1),
            IpAddr::V6(_) if prefix <= IPV6_BITS - 2 => (network_u128 + 1, broadcast_u128),
            _ => (network_u128, broadcast_u128),
        };

        // Re-anchor on the network address in case `net` carried host bits.
        let network = IpNetwork::new(network_addr, prefix).unwrap_or(net);

        Self {
            network,
            first_host,
            last_host,
        }
    }
}

impl FromStr for AddressRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::expand(s)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.ip(), self.network.prefix())
    }
}

/// Iterator over the usable hosts of an [`AddressRange`].
#[derive(Debug, Clone)]
pub struct HostIter {
    front: u128,
    back: u128,
    exhausted: bool,
    is_ipv4: bool,
}

impl Iterator for HostIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        if self.exhausted {
            return None;
        }
        let current: u128 = self.front;
        if current == self.back {
            self.exhausted = true;
        } else {
            self.front += 1;
        }
        Some(to_addr(current, self.is_ipv4))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining: u128 = self.back - self.front;
        match usize::try_from(remaining).ok().and_then(|r| r.checked_add(1)) {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for HostIter {
    fn next_back(&mut self) -> Option<IpAddr> {
        if self.exhausted {
            return None;
        }
        let current: u128 = self.back;
        if current == self.front {
            self.exhausted = true;
        } else {
            self.back -= 1;
        }
        Some(to_addr(current, self.is_ipv4))
    }
}

impl FusedIterator for HostIter {}

fn parse_prefix(prefix_str: &str, max_prefix: u8) -> Result<u8, String> {
    if prefix_str.is_empty() || !prefix_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("bad prefix '{prefix_str}'"));
    }
    let prefix: u8 = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("bad prefix '{prefix_str}': {e}"))?;
    if prefix > max_prefix {
        return Err(format!("prefix /{prefix} exceeds /{max_prefix}"));
    }
    Ok(prefix)
}

/// Network and broadcast addresses of the block `addr/prefix`.
fn block_bounds(addr: IpAddr, prefix: u8) -> (IpAddr, IpAddr) {
    let bits: u8 = match addr {
        IpAddr::V4(_) => IPV4_BITS,
        IpAddr::V6(_) => IPV6_BITS,
    };
    let host_bits: u32 = u32::from(bits.saturating_sub(prefix));
    let host_mask: u128 = match host_bits {
        128 => u128::MAX,
        n => (1u128 << n) - 1,
    };
    let value: u128 = to_u128(addr);
    let network: u128 = value & !host_mask;
    let broadcast: u128 = network | host_mask;
    (
        to_addr(network, addr.is_ipv4()),
        to_addr(broadcast, addr.is_ipv4()),
    )
}

fn to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn to_addr(value: u128, is_ipv4: bool) -> IpAddr {
    if is_ipv4 {
        IpAddr::V4(Ipv4Addr::from(value as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(value))
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

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn host_counts_follow_prefix_length() {
        let cases: &[(&str, u128)] = &[
            ("192.168.1.0/24", 254),
            ("10.0.0.0/30", 2),
            ("10.0.0.0/29", 6),
            ("10.0.0.0/31", 2),
            ("10.0.0.7/32", 1),
            ("fd00::/126", 3),
            ("fd00::/127", 2),
            ("fd00::1/128", 1),
        ];

        for (cidr, expected) in cases {
            let range = AddressRange::expand(cidr).unwrap();
            assert_eq!(range.len(), *expected, "len of {cidr}");
            assert_eq!(range.hosts().count() as u128, *expected, "iterated hosts of {cidr}");
        }
    }

    #[test]
    fn slash_30_excludes_network_and_broadcast() {
        let range = AddressRange::expand("10.0.0.0/30").unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(hosts, vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);
    }

    #[test]
    fn slash_31_keeps_both_addresses() {
        let range = AddressRange::expand("10.0.0.4/31").unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(hosts, vec![v4(10, 0, 0, 4), v4(10, 0, 0, 5)]);
    }

    #[test]
    fn ipv6_skips_only_the_anycast_address() {
        let range = AddressRange::expand("fd00::/126").unwrap();
        let hosts: Vec<String> = range.hosts().map(|ip| ip.to_string()).collect();
        assert_eq!(hosts, vec!["fd00::1", "fd00::2", "fd00::3"]);
    }

    #[test]
    fn host_bits_are_masked_off() {
        let range = AddressRange::expand("192.168.1.77/24").unwrap();
        assert_eq!(range.network(), v4(192, 168, 1, 0));
        assert_eq!(range.to_string(), "192.168.1.0/24");
        assert_eq!(range.first_host(), v4(192, 168, 1, 1));
        assert_eq!(range.last_host(), v4(192, 168, 1, 254));
    }

    #[test]
    fn bare_address_is_a_single_host() {
        let range = AddressRange::expand(" 127.0.0.1 ").unwrap();
        assert_eq!(range.prefix(), 32);
        assert_eq!(range.hosts().collect::<Vec<_>>(), vec![v4(127, 0, 0, 1)]);
    }

    #[test]
    fn every_host_lies_within_the_block() {
        let range = AddressRange::expand("172.16.5.0/27").unwrap();
        for host in range.hosts() {
            assert!(range.contains(host), "{host} escaped {range}");
            assert_ne!(host, v4(172, 16, 5, 0));
            assert_ne!(host, v4(172, 16, 5, 31));
        }
        assert!(!range.contains(v4(172, 16, 5, 32)));
    }

    #[test]
    fn traversals_are_independent() {
        let range = AddressRange::expand("10.1.0.0/28").unwrap();
        let mut first = range.hosts();
        first.next();
        first.next();
        assert_eq!(range.hosts().count(), 14);
        assert_eq!(first.count(), 12);
    }

    #[test]
    fn large_blocks_are_not_materialised() {
        let range = AddressRange::expand("10.0.0.0/8").unwrap();
        assert_eq!(range.len(), (1u128 << 24) - 2);
        let head: Vec<IpAddr> = range.hosts().take(2).collect();
        assert_eq!(head, vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);
        assert_eq!(range.hosts().next_back(), Some(v4(10, 255, 255, 254)));

        let whole_v6 = AddressRange::expand("::/0").unwrap();
        assert_eq!(whole_v6.len(), u128::MAX);
        assert_eq!(whole_v6.hosts().size_hint().1, None);
    }

    #[test]
    fn iterator_is_double_ended() {
        let range = AddressRange::expand("10.0.0.0/29").unwrap();
        let mut iter = range.hosts();
        assert_eq!(iter.next_back(), Some(v4(10, 0, 0, 6)));
        assert_eq!(iter.next(), Some(v4(10, 0, 0, 1)));
        assert_eq!(iter.size_hint(), (4, Some(4)));
        assert_eq!(iter.by_ref().rev().count(), 4);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let bad = [
            "",
            "   ",
            "not-a-range",
            "10.0.0.0/33",
            "10.0.0.0/",
            "10.0.0.0/+8",
            "10.0.0.0/-1",
            "10.0.0.0/24/8",
            "10.0.0.256/24",
            "10.0.0/24",
            "fd00::/129",
            "192.168.1.1-50",
        ];

        for input in bad {
            match AddressRange::expand(input) {
                Err(RangeError::InvalidRange { input: offending, .. }) => {
                    assert_eq!(offending, input)
                }
                Ok(range) => panic!("'{input}' parsed as {range}"),
            }
        }
    }

    #[test]
    fn from_str_matches_expand() {
        let parsed: AddressRange = "10.0.0.0/30".parse().unwrap();
        assert_eq!(parsed, AddressRange::expand("10.0.0.0/30").unwrap());
    }
}
