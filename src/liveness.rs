use crate::mode::Strategy;
use crate::pool;
use crate::store::LiveHostSet;
use crate::types::Endpoint;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, info};

/// Counters shared by all probe tasks of one phase.
#[derive(Debug, Default)]
pub struct ProbeProgress {
    pub probed: AtomicU64,
    pub live: AtomicU64,
}

/// Whether a TCP connection to `endpoint` can be established within `timeout`.
///
/// The connection is closed again right away; refused, unreachable, timed out
/// and unresolvable are all just "not live".
pub async fn port_is_open(endpoint: &Endpoint, timeout: Duration) -> bool {
    let Some(port) = endpoint.port_number() else {
        return false;
    };
    let connect = TcpStream::connect((endpoint.address.as_str(), port));
    matches!(time::timeout(timeout, connect).await, Ok(Ok(_)))
}

/// Probe every endpoint under `strategy` and record reachable ones in `live`.
pub async fn check_live_hosts(
    endpoints: Vec<Endpoint>,
    strategy: Strategy,
    timeout: Duration,
    live: Arc<LiveHostSet>,
) -> Result<Arc<ProbeProgress>> {
    let total = endpoints.len();
    let progress = Arc::new(ProbeProgress::default());

    match strategy {
        Strategy::WorkerPool { .. } => info!("Checking live hosts (worker pool)..."),
        Strategy::BoundedFanout { .. } => info!("Checking live hosts..."),
    }

    let shared = progress.clone();
    pool::run(strategy, endpoints, move |endpoint| {
        let live = live.clone();
        let progress = shared.clone();
        async move {
            if port_is_open(&endpoint, timeout).await {
                info!(target: crate::logging::FOUND, "Host is live: {endpoint}");
                if live.insert(endpoint).await {
                    progress.live.fetch_add(1, Ordering::Relaxed);
                }
            } else {
                debug!("Host is not reachable: {endpoint}");
            }
            progress.probed.fetch_add(1, Ordering::Relaxed);
        }
    })
    .await?;

    info!("Live host checking completed.");
    let found = progress.live.load(Ordering::Relaxed);
    if found > 0 {
        info!("Found {found} live hosts from {total} combinations host:port.");
    }
    Ok(progress)
}
