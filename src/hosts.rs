use ipnet::{IpNet, Ipv4Net};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, warn};

/// Turn raw host entries into a deduplicated list of literal addresses.
///
/// - entries are trimmed and lowercased, blanks dropped
/// - IPv4 CIDR blocks are expanded (see [`expand_cidr`])
/// - IP literals are kept as-is
/// - anything else is kept only if it resolves
///
/// Order of first appearance is preserved.
pub async fn normalize_hosts(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for entry in raw {
        let host = entry.trim().to_lowercase();
        if host.is_empty() {
            continue;
        }

        if host.contains('/') {
            match host.parse::<IpNet>() {
                Ok(net) => {
                    for ip in expand_cidr(net) {
                        let ip = ip.to_string();
                        if seen.insert(ip.clone()) {
                            out.push(ip);
                        }
                    }
                }
                Err(e) => warn!("Skipping invalid CIDR {host}: {e}"),
            }
            continue;
        }

        if seen.contains(&host) {
            continue;
        }
        if host.parse::<IpAddr>().is_ok() || resolves(&host).await {
            seen.insert(host.clone());
            out.push(host);
        } else {
            warn!("Skipping unresolvable host {host}");
        }
    }

    debug!("Normalized {} host entries into {} addresses", raw.len(), out.len());
    out
}

async fn resolves(host: &str) -> bool {
    match tokio::net::lookup_host((host, 0u16)).await {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(_) => false,
    }
}

/// Expand a CIDR block into scan targets.
///
/// For IPv4 the network and broadcast addresses are dropped when the block
/// holds more than two addresses, so `/31` and `/32` keep everything.
/// IPv6 blocks are not expanded and yield nothing.
pub fn expand_cidr(cidr: IpNet) -> Vec<IpAddr> {
    match cidr {
        IpNet::V4(n4) => expand_ipv4net_hosts(n4)
            .into_iter()
            .map(IpAddr::V4)
            .collect(),
        IpNet::V6(n6) => {
            warn!("Skipping IPv6 CIDR {n6}: only IPv4 blocks are expanded");
            Vec::new()
        }
    }
}

fn expand_ipv4net_hosts(net: Ipv4Net) -> Vec<Ipv4Addr> {
    let start = u32::from(net.network());
    let end = u32::from(net.broadcast());
    if end - start < 2 {
        return (start..=end).map(Ipv4Addr::from).collect();
    }
    (start + 1..end).map(Ipv4Addr::from).collect()
}
