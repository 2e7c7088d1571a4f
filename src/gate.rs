//! Per-endpoint pacing for the rate-limited login variants.

use crate::types::Endpoint;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Lazily created single-slot gates, one per endpoint.
///
/// The map lock is only taken to look up or create a gate; acquiring the gate
/// itself happens outside of it.
#[derive(Debug, Default)]
pub struct GateRegistry {
    gates: Mutex<HashMap<Endpoint, Arc<Semaphore>>>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate for `endpoint`, created on first use.
    pub fn gate(&self, endpoint: &Endpoint) -> Arc<Semaphore> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        gates
            .entry(endpoint.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Serializes attempts per endpoint and spaces them by `delay`.
#[derive(Debug)]
pub struct RateLimiter {
    registry: GateRegistry,
    delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            registry: GateRegistry::new(),
            delay,
        }
    }

    /// Wait until no other attempt holds `endpoint`.
    pub async fn acquire(&self, endpoint: &Endpoint) -> Result<EndpointPermit> {
        let permit = self.registry.gate(endpoint).acquire_owned().await?;
        Ok(EndpointPermit {
            permit,
            delay: self.delay,
        })
    }
}

/// Exclusive hold on one endpoint.
///
/// Dropping it releases the endpoint right away; [`EndpointPermit::cool_down`]
/// keeps it held for the configured delay first.
#[derive(Debug)]
pub struct EndpointPermit {
    permit: OwnedSemaphorePermit,
    delay: Duration,
}

impl EndpointPermit {
    /// Sleep for the delay, then release the endpoint.
    pub async fn cool_down(self) {
        tokio::time::sleep(self.delay).await;
        drop(self.permit);
    }
}
