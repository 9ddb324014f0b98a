use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_DNS_PORT: u16 = 53;

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

/// Parses an upstream server written as `IP`, `IP:PORT` or `[IPv6]:PORT`.
///
/// Hostnames are rejected: an upstream used to resolve names cannot itself
/// need resolving.
pub fn parse_upstream_server(s: &str) -> Option<SocketAddr> {
    let s = s.trim();
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }
    let (host, port) = parse_host_port(s)?;
    let ip = host.parse::<IpAddr>().ok()?;
    Some(SocketAddr::new(ip, port))
}

/// Keeps the configured order and silently drops entries that do not parse.
pub fn parse_upstream_servers<S: AsRef<str>>(servers: &[S]) -> Vec<SocketAddr> {
    servers
        .iter()
        .filter_map(|s| parse_upstream_server(s.as_ref()))
        .collect()
}
