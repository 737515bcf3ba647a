//! Local address discovery
//!
//! The portal login request must carry the client's campus-facing IPv4
//! address (`wlan_user_ip`). Discovery is best effort: a connected UDP
//! socket reveals the address the OS would route outbound traffic from,
//! the hostname lookup covers machines without a default route, and the
//! loopback sentinel keeps the caller from ever failing here.

use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs, UdpSocket};
use tracing::debug;

/// Resolve the local IP address. Never fails; falls back to `127.0.0.1`.
///
/// Strategies are tried once each, in order:
/// 1. "Connect" a UDP socket toward a public address and read the locally
///    bound address (no datagram is actually sent).
/// 2. Resolve the machine's own hostname, first IPv4 result.
/// 3. Loopback.
pub fn resolve_local_ip() -> IpAddr {
    resolve_with(udp_probe, hostname_lookup)
}

/// Strategy chain with injectable probes (for testing).
fn resolve_with(
    probe: impl Fn() -> Option<IpAddr>,
    lookup: impl Fn() -> Option<IpAddr>,
) -> IpAddr {
    if let Some(ip) = probe() {
        debug!("Local IP via UDP probe: {}", ip);
        return ip;
    }
    if let Some(ip) = lookup() {
        debug!("Local IP via hostname lookup: {}", ip);
        return ip;
    }
    debug!("Local IP discovery failed, using loopback");
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn udp_probe() -> Option<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    Some(socket.local_addr().ok()?.ip())
}

fn hostname_lookup() -> Option<IpAddr> {
    let name = hostname::get().ok()?.into_string().ok()?;
    (name.as_str(), 0)
        .to_socket_addrs()
        .ok()?
        .map(|addr| addr.ip())
        .find(|ip| ip.is_ipv4())
}
