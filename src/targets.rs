use crate::types::{CredentialAttempt, Endpoint};
use std::collections::HashSet;
use tracing::debug;

/// Cartesian product of hosts and ports with duplicate pairs removed.
///
/// Order of first appearance is kept: every port of the first host, then the
/// next host, and so on.
pub fn build_endpoints(hosts: &[String], ports: &[String]) -> Vec<Endpoint> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for host in hosts {
        for port in ports {
            let ep = Endpoint::new(host.as_str(), port.as_str());
            if seen.insert(ep.clone()) {
                out.push(ep);
            }
        }
    }
    debug!("Total combinations of host:port to check: {}", out.len());
    out
}

/// Cartesian product of live endpoints, users and passwords, deduplicated on
/// all four fields.
pub fn build_attempts(
    endpoints: &[Endpoint],
    users: &[String],
    passwords: &[String],
) -> Vec<CredentialAttempt> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for password in passwords {
        for user in users {
            for ep in endpoints {
                let attempt = CredentialAttempt::new(ep.clone(), user.as_str(), password.as_str());
                if seen.insert(attempt.work_key()) {
                    out.push(attempt);
                }
            }
        }
    }
    debug!("Total combinations of login to check: {}", out.len());
    out
}
