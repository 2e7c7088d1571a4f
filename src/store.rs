use crate::types::{CredentialAttempt, Endpoint};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use tokio::sync::Mutex;

/// Endpoints confirmed reachable during this run. Append-only.
#[derive(Debug, Default)]
pub struct LiveHostSet {
    inner: Mutex<LiveInner>,
}

#[derive(Debug, Default)]
struct LiveInner {
    seen: HashSet<Endpoint>,
    order: Vec<Endpoint>,
}

impl LiveHostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `endpoint` as live. Returns `false` if it was already recorded.
    pub async fn insert(&self, endpoint: Endpoint) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.seen.insert(endpoint.clone()) {
            guard.order.push(endpoint);
            true
        } else {
            false
        }
    }

    /// Live endpoints in the order they were confirmed.
    pub async fn snapshot(&self) -> Vec<Endpoint> {
        self.inner.lock().await.order.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Working credentials keyed by [`CredentialAttempt::result_key`].
///
/// Holds at most one entry per (address, port, user); the first success
/// recorded for an account is kept and later ones are dropped.
#[derive(Debug, Default)]
pub struct ValidLoginSet {
    inner: Mutex<HashMap<String, CredentialAttempt>>,
}

impl ValidLoginSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.contains_key(key)
    }

    /// Insert `login` unless its account is already present.
    ///
    /// `on_insert` is awaited with the set still locked and only for a new
    /// entry, so side effects tied to a discovery happen exactly once per
    /// account and in order.
    pub async fn insert_with<F, Fut>(&self, login: CredentialAttempt, on_insert: F) -> bool
    where
        F: FnOnce(CredentialAttempt) -> Fut,
        Fut: Future<Output = ()>,
    {
        let key = login.result_key();
        let mut guard = self.inner.lock().await;
        if guard.contains_key(&key) {
            return false;
        }
        on_insert(login.clone()).await;
        guard.insert(key, login);
        true
    }

    #[cfg(test)]
    async fn insert_if_absent(&self, login: CredentialAttempt) -> bool {
        self.insert_with(login, |_| async {}).await
    }

    #[cfg(test)]
    async fn get(&self, key: &str) -> Option<CredentialAttempt> {
        self.inner.lock().await.get(key).cloned()
    }

    /// All entries, sorted by key.
    pub async fn snapshot(&self) -> Vec<CredentialAttempt> {
        let guard = self.inner.lock().await;
        let mut entries: Vec<(&String, &CredentialAttempt)> = guard.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, v)| v.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
