//! Local network probing helpers.
//!
//! Everything here is best-effort: callers fall back to safe defaults
//! (`localhost`, the limited broadcast address) when detection fails.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use anyhow::Result;
use if_addrs::IfAddr;


/// Determines the preferred outbound IP address of this machine.
///
/// Uses the UDP-connect trick: connect a socket to a well-known public
/// address and read back the local address the kernel picked for the route.
/// No packet is actually sent.
pub fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    Some(socket.local_addr().ok()?.ip())
}

/// Lists all non-loopback IPv4 addresses of this machine.
pub fn local_ipv4s() -> Vec<Ipv4Addr> {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::warn!("Could not enumerate network interfaces: {}", e);
            return Vec::new();
        }
    };

    interfaces
        .into_iter()
        .filter(|interface| !interface.is_loopback())
        .filter_map(|interface| match interface.addr {
            IfAddr::V4(v4) => Some(v4.ip),
            _ => None,
        })
        .collect()
}

/// Resolves the IPv4 broadcast address used for discovery announcements.
///
/// Scans for the first non-loopback interface with an IPv4 address and
/// computes its directed broadcast address from the netmask. Falls back to
/// the limited broadcast address when no suitable interface exists.
pub fn find_broadcast_address() -> Result<Ipv4Addr> {
    let interfaces = if_addrs::get_if_addrs()?;

    for interface in interfaces {
        if interface.is_loopback() {
            continue;
        }
        if let IfAddr::V4(v4) = interface.addr {
            return Ok(directed_broadcast(v4.ip, v4.netmask));
        }
    }

    Ok(Ipv4Addr::BROADCAST)
}

/// Computes the directed broadcast address for a network: `ip | !mask`.
pub fn directed_broadcast(ip: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(netmask))
}
