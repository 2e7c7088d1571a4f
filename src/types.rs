use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use ::time::{format_description::well_known, OffsetDateTime};

/// One `address:port` pair to probe or log in to.
///
/// Identity is the exact string pair; no normalization happens here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub address: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: port.into(),
        }
    }

    /// Numeric port, if the string form is a valid TCP port.
    pub fn port_number(&self) -> Option<u16> {
        self.port.parse::<u16>().ok().filter(|p| *p != 0)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// A single (endpoint, user, password) login candidate.
///
/// Serialized flat as `{address, port, user, password}`, which is also the
/// record format of the JSON result snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialAttempt {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub user: String,
    pub password: String,
}

impl CredentialAttempt {
    pub fn new(endpoint: Endpoint, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint,
            user: user.into(),
            password: password.into(),
        }
    }

    /// Fingerprint of `address:port:user`. Passwords are excluded so that only
    /// the first working password per account is ever kept.
    pub fn result_key(&self) -> String {
        fingerprint(&format!(
            "{}:{}:{}",
            self.endpoint.address, self.endpoint.port, self.user
        ))
    }

    /// Fingerprint of all four fields, used to deduplicate pending work.
    pub fn work_key(&self) -> String {
        fingerprint(&format!(
            "{}:{}:{}:{}",
            self.endpoint.address, self.endpoint.port, self.user, self.password
        ))
    }

    /// `address:port | user | password`, the line format of the text output.
    pub fn to_line(&self) -> String {
        format!(
            "{}:{} | {} | {}",
            self.endpoint.address, self.endpoint.port, self.user, self.password
        )
    }
}

/// Lowercase hex MD5 of `input`.
pub fn fingerprint(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Wall-clock and per-phase timings of one run.
#[derive(Debug, Clone)]
pub struct RunTimingStats {
    pub started_at: String,
    pub live_check: Duration,
    pub login_check: Duration,
    pub total: Duration,
    start: Instant,
}

impl RunTimingStats {
    pub fn start() -> Self {
        Self {
            started_at: now_rfc3339(),
            live_check: Duration::ZERO,
            login_check: Duration::ZERO,
            total: Duration::ZERO,
            start: Instant::now(),
        }
    }

    pub fn finish(&mut self) {
        self.total = self.start.elapsed();
    }

    /// Login-phase time divided by the number of valid logins found.
    pub fn average_per_login(&self, valid_logins: usize) -> Option<Duration> {
        if valid_logins == 0 {
            return None;
        }
        u32::try_from(valid_logins)
            .ok()
            .map(|n| self.login_check / n)
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_key_ignores_password() {
        let ep = Endpoint::new("10.0.0.1", "22");
        let a = CredentialAttempt::new(ep.clone(), "root", "pass1");
        let b = CredentialAttempt::new(ep, "root", "pass2");
        assert_eq!(a.result_key(), b.result_key());
        assert_ne!(a.work_key(), b.work_key());
    }

    #[test]
    fn result_key_is_md5_of_address_port_user() {
        let a = CredentialAttempt::new(Endpoint::new("10.0.0.1", "22"), "root", "x");
        assert_eq!(a.result_key(), format!("{:x}", md5::compute("10.0.0.1:22:root")));
        assert_eq!(a.result_key().len(), 32);
    }

    #[test]
    fn record_serializes_flat() {
        let a = CredentialAttempt::new(Endpoint::new("10.0.0.1", "2222"), "admin", "hunter2");
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "address": "10.0.0.1",
                "port": "2222",
                "user": "admin",
                "password": "hunter2"
            })
        );
    }

    #[test]
    fn line_format() {
        let a = CredentialAttempt::new(Endpoint::new("192.168.1.5", "22"), "pi", "raspberry");
        assert_eq!(a.to_line(), "192.168.1.5:22 | pi | raspberry");
    }

    #[test]
    fn endpoint_display_brackets_ipv6() {
        assert_eq!(Endpoint::new("::1", "22").to_string(), "[::1]:22");
        assert_eq!(Endpoint::new("host", "22").to_string(), "host:22");
    }

    #[test]
    fn average_per_login() {
        let mut stats = RunTimingStats::start();
        stats.login_check = Duration::from_secs(10);
        assert_eq!(stats.average_per_login(0), None);
        assert_eq!(stats.average_per_login(4), Some(Duration::from_millis(2500)));
    }
}
