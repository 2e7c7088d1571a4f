use crate::auth::Authenticator;
use crate::config::{ScanConfig, LIVE_CHECK_TIMEOUT, LOGIN_TIMEOUT};
use crate::liveness;
use crate::login::{self, LoginContext};
use crate::mode;
use crate::persist::ResultWriter;
use crate::store::{LiveHostSet, ValidLoginSet};
use crate::targets;
use crate::types::{CredentialAttempt, Endpoint, RunTimingStats};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// How a run ended. Every variant is a normal, successful termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NoLiveHosts,
    NoValidLogins,
    Found { logins: usize },
}

/// Drives one scan: liveness sweep, login sweep, persistence.
pub struct Checker {
    config: ScanConfig,
    auth: Arc<dyn Authenticator>,
    live: Arc<LiveHostSet>,
    logins: Arc<ValidLoginSet>,
    writer: Arc<ResultWriter>,
    stats: RunTimingStats,
}

impl Checker {
    pub fn new(config: &ScanConfig, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            config: config.clone(),
            auth,
            live: Arc::new(LiveHostSet::new()),
            logins: Arc::new(ValidLoginSet::new()),
            writer: Arc::new(ResultWriter::new(
                config.output_base.clone(),
                config.format,
            )),
            stats: RunTimingStats::start(),
        }
    }

    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.stats = RunTimingStats::start();
        info!("Scan started at {}", self.stats.started_at);

        let phase = Instant::now();
        self.run_live_check().await?;
        self.stats.live_check = phase.elapsed();

        if self.live.is_empty().await {
            self.stats.finish();
            warn!("No live hosts found. Exiting.");
            return Ok(RunOutcome::NoLiveHosts);
        }

        let phase = Instant::now();
        self.run_login_check().await?;
        self.stats.login_check = phase.elapsed();
        self.stats.finish();

        let found = self.logins.len().await;
        self.print_time_stats(found);

        if found == 0 {
            warn!("No valid logins found.");
            return Ok(RunOutcome::NoValidLogins);
        }

        self.writer.persist_all(self.logins.snapshot().await).await;
        Ok(RunOutcome::Found { logins: found })
    }

    async fn run_live_check(&self) -> Result<()> {
        let endpoints = targets::build_endpoints(&self.config.hosts, &self.config.ports);
        let strategy = mode::select_live_strategy(&self.config, endpoints.len());
        info!("Live host checking mode: {strategy}");
        liveness::check_live_hosts(endpoints, strategy, LIVE_CHECK_TIMEOUT, self.live.clone())
            .await?;
        Ok(())
    }

    async fn run_login_check(&self) -> Result<()> {
        let live = self.live.snapshot().await;
        let attempts =
            targets::build_attempts(&live, &self.config.users, &self.config.passwords);
        let plan = mode::select_login_plan(&self.config, attempts.len());
        info!("SSH login mode: {plan}");
        let ctx = Arc::new(LoginContext::new(
            self.auth.clone(),
            self.logins.clone(),
            self.writer.clone(),
            LOGIN_TIMEOUT,
            plan.rate_limit,
        ));
        login::check_logins(attempts, plan, ctx).await
    }

    fn print_time_stats(&self, found: usize) {
        info!("Time statistics:");
        info!("    Live host check : {:?}", self.stats.live_check);
        info!("    SSH login check : {:?}", self.stats.login_check);
        info!("    Total runtime   : {:?}", self.stats.total);
        if let Some(avg) = self.stats.average_per_login(found) {
            info!("    Avg time/login  : {avg:?}");
        }
    }

    pub fn stats(&self) -> &RunTimingStats {
        &self.stats
    }

    pub async fn live_hosts(&self) -> Vec<Endpoint> {
        self.live.snapshot().await
    }

    pub async fn valid_logins(&self) -> Vec<CredentialAttempt> {
        self.logins.snapshot().await
    }
}
