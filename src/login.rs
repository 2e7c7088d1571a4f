use crate::auth::{AuthRequest, Authenticator};
use crate::gate::RateLimiter;
use crate::logging::FOUND;
use crate::mode::LoginPlan;
use crate::persist::ResultWriter;
use crate::pool;
use crate::store::ValidLoginSet;
use crate::types::CredentialAttempt;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Counters shared by all login tasks of one phase.
#[derive(Debug, Default)]
pub struct LoginProgress {
    /// Network attempts actually made.
    pub attempted: AtomicU64,
    /// Attempts skipped because the account was already cracked.
    pub skipped: AtomicU64,
    pub rejected: AtomicU64,
    pub found: AtomicU64,
}

/// Everything a single login task needs.
pub struct LoginContext {
    pub auth: Arc<dyn Authenticator>,
    pub results: Arc<ValidLoginSet>,
    pub writer: Arc<ResultWriter>,
    pub timeout: Duration,
    pub limiter: Option<RateLimiter>,
    pub progress: LoginProgress,
}

impl LoginContext {
    pub fn new(
        auth: Arc<dyn Authenticator>,
        results: Arc<ValidLoginSet>,
        writer: Arc<ResultWriter>,
        timeout: Duration,
        rate_limit: Option<Duration>,
    ) -> Self {
        Self {
            auth,
            results,
            writer,
            timeout,
            limiter: rate_limit.map(RateLimiter::new),
            progress: LoginProgress::default(),
        }
    }

    /// Test one candidate, honoring per-endpoint pacing when configured.
    pub async fn check(&self, attempt: CredentialAttempt) {
        let key = attempt.result_key();
        match &self.limiter {
            None => {
                if self.already_found(&key).await {
                    return;
                }
                let ok = self.try_login(&attempt).await;
                self.settle(attempt, ok).await;
            }
            Some(limiter) => {
                let permit = match limiter.acquire(&attempt.endpoint).await {
                    Ok(p) => p,
                    Err(e) => {
                        error!("endpoint gate closed for {}: {e}", attempt.endpoint);
                        return;
                    }
                };
                // Checked under the gate; a success is settled before the
                // gate is released, so it is always visible here.
                if self.already_found(&key).await {
                    return;
                }
                let ok = self.try_login(&attempt).await;
                self.settle(attempt, ok).await;
                permit.cool_down().await;
            }
        }
    }

    async fn already_found(&self, key: &str) -> bool {
        if self.results.contains(key).await {
            self.progress.skipped.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    async fn try_login(&self, attempt: &CredentialAttempt) -> bool {
        self.progress.attempted.fetch_add(1, Ordering::Relaxed);
        let req = AuthRequest {
            endpoint: &attempt.endpoint,
            user: &attempt.user,
            password: &attempt.password,
            timeout: self.timeout,
            verify_host_identity: false,
        };
        match self.auth.authenticate(&req).await {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    "Invalid login: {}@{} with password: {} ({e})",
                    attempt.user, attempt.endpoint, attempt.password
                );
                false
            }
        }
    }

    async fn settle(&self, attempt: CredentialAttempt, ok: bool) {
        if !ok {
            self.progress.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let writer = &self.writer;
        let inserted = self
            .results
            .insert_with(attempt, |login| async move {
                info!(
                    target: FOUND,
                    "Valid login found: {}@{} with password: {}",
                    login.user, login.endpoint, login.password
                );
                writer.persist_one(login).await;
            })
            .await;
        if inserted {
            self.progress.found.fetch_add(1, Ordering::Relaxed);
        } else {
            debug!("Dropping second working password for an account already recorded");
        }
    }
}

/// Test every attempt according to `plan`, recording and persisting successes.
pub async fn check_logins(
    attempts: Vec<CredentialAttempt>,
    plan: LoginPlan,
    ctx: Arc<LoginContext>,
) -> Result<()> {
    match (plan.strategy.is_pool(), plan.rate_limit.is_some()) {
        (false, false) => info!("Checking SSH logins..."),
        (false, true) => info!("Checking SSH logins with per-host rate limit..."),
        (true, false) => info!("Checking SSH logins (worker pool)..."),
        (true, true) => info!("Checking SSH logins (worker pool + per-host rate limit)..."),
    }

    let shared = ctx.clone();
    pool::run(plan.strategy, attempts, move |attempt| {
        let ctx = shared.clone();
        async move { ctx.check(attempt).await }
    })
    .await?;

    info!("SSH login checking completed.");
    let p = &ctx.progress;
    debug!(
        "Login attempts: {} made, {} skipped, {} rejected",
        p.attempted.load(Ordering::Relaxed),
        p.skipped.load(Ordering::Relaxed),
        p.rejected.load(Ordering::Relaxed),
    );
    let found = ctx.results.len().await;
    if found > 0 {
        info!("Found {found} valid login combinations.");
    }
    Ok(())
}
