//! # Local Interface Lookup
//!
//! Supplies the default scan target (the private IPv4 network of the best LAN
//! interface) and the local address used for outbound traffic. The scanner
//! itself never calls into this module; the CLI passes the result in.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::network::range::AddressRange;

#[cfg(target_os = "linux")]
use linux_impl::is_physical;
#[cfg(not(target_os = "linux"))]
use fallback_impl::is_physical;

/// Destination used to pick an outbound route. Nothing is ever sent to it.
const ROUTE_PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(1, 1, 1, 1), 80);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback interfaces never lead to a LAN.
    IsLoopback,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface carries no private IPv4 network.
    NoPrivateIpv4,
}

/// Finds the private IPv4 network of the best LAN interface.
pub fn get_lan_network() -> anyhow::Result<Option<Ipv4Network>> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| is_viable_lan_interface(interface).is_ok())
        .collect();

    let Some(interface) = select_best_lan_interface(interfaces, is_physical) else {
        anyhow::bail!("No interfaces available for LAN discovery");
    };

    Ok(private_ipv4_net(&interface))
}

/// The LAN network as a scannable range.
pub fn get_lan_range() -> anyhow::Result<AddressRange> {
    match get_lan_network()? {
        Some(net) => Ok(AddressRange::from(IpNetwork::V4(net))),
        None => anyhow::bail!("LAN interface has no private IPv4 network"),
    }
}

/// The local address the OS would use to reach the internet.
///
/// Connecting a UDP socket only selects a route; no packet leaves the host.
pub fn get_local_ip() -> anyhow::Result<IpAddr> {
    let socket: UdpSocket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(ROUTE_PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if private_ipv4_net(interface).is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    interfaces
        .iter()
        .find(|&interface| is_physical(interface))
        .or(interfaces.first())
        .cloned()
}

fn private_ipv4_net(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(*v4),
        _ => None,
    })
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some()
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
