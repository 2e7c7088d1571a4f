#![allow(dead_code)]

use async_trait::async_trait;
use ssh_check_rs::auth::{AuthError, AuthRequest, Authenticator};
use ssh_check_rs::types::Endpoint;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Authenticator double: accepts a fixed set of (user, password) pairs and
/// records timing and overlap of calls per endpoint.
pub struct MockAuth {
    accept: HashSet<(String, String)>,
    accept_any_password_for: HashSet<String>,
    work: Duration,
    pub calls: AtomicUsize,
    pub overlap: AtomicBool,
    in_flight: Mutex<HashMap<Endpoint, usize>>,
    spans: Mutex<Vec<(Endpoint, Instant, Instant)>>,
}

impl MockAuth {
    pub fn accepting(pairs: &[(&str, &str)]) -> Self {
        Self {
            accept: pairs
                .iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
            accept_any_password_for: HashSet::new(),
            work: Duration::ZERO,
            calls: AtomicUsize::new(0),
            overlap: AtomicBool::new(false),
            in_flight: Mutex::new(HashMap::new()),
            spans: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_all() -> Self {
        Self::accepting(&[])
    }

    pub fn any_password_for(mut self, user: &str) -> Self {
        self.accept_any_password_for.insert(user.to_string());
        self
    }

    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (start, end) of every call against `endpoint`, sorted by start.
    pub fn spans_for(&self, endpoint: &Endpoint) -> Vec<(Instant, Instant)> {
        let mut spans: Vec<_> = self
            .spans
            .lock()
            .unwrap()
            .iter()
            .filter(|(ep, _, _)| ep == endpoint)
            .map(|(_, s, e)| (*s, *e))
            .collect();
        spans.sort();
        spans
    }
}

#[async_trait]
impl Authenticator for MockAuth {
    async fn authenticate(&self, req: &AuthRequest<'_>) -> Result<(), AuthError> {
        assert!(!req.verify_host_identity);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        {
            let mut map = self.in_flight.lock().unwrap();
            let n = map.entry(req.endpoint.clone()).or_insert(0);
            *n += 1;
            if *n > 1 {
                self.overlap.store(true, Ordering::SeqCst);
            }
        }
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        {
            let mut map = self.in_flight.lock().unwrap();
            if let Some(n) = map.get_mut(req.endpoint) {
                *n -= 1;
            }
        }
        self.spans
            .lock()
            .unwrap()
            .push((req.endpoint.clone(), start, Instant::now()));

        let pair = (req.user.to_string(), req.password.to_string());
        if self.accept.contains(&pair) || self.accept_any_password_for.contains(req.user) {
            Ok(())
        } else {
            Err(AuthError::Rejected)
        }
    }
}

/// Fresh empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ssh-check-rs-it-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}
