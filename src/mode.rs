//! Per-phase choice of concurrency strategy.
//!
//! Each phase runs either as a bounded fanout (one task per work item behind a
//! semaphore) or as a fixed pool of workers draining a shared queue. A pool is
//! picked when the operator asked for workers or when the phase has enough
//! work to make one worthwhile. The login phase additionally switches to a
//! per-endpoint rate-limited variant whenever a delay is configured.

use crate::config::ScanConfig;
use std::fmt;
use std::time::Duration;

/// Pending endpoints at which the liveness phase switches to a worker pool.
pub const LIVE_POOL_THRESHOLD: usize = 500;
/// Pending login attempts at which the login phase switches to a worker pool.
pub const LOGIN_POOL_THRESHOLD: usize = 100;
/// Smallest liveness worker pool.
pub const LIVE_MIN_WORKERS: usize = 50;
/// Smallest login worker pool.
pub const LOGIN_MIN_WORKERS: usize = 10;
/// Smallest per-endpoint delay of the rate-limited bounded-fanout variant.
pub const FANOUT_MIN_DELAY: Duration = Duration::from_millis(200);
/// Per-endpoint delay of the rate-limited worker-pool variant when none is set.
pub const POOL_DEFAULT_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One task per item, at most `limit` in flight.
    BoundedFanout { limit: usize },
    /// `workers` long-lived tasks pulling from one queue.
    WorkerPool { workers: usize },
}

impl Strategy {
    pub fn is_pool(&self) -> bool {
        matches!(self, Strategy::WorkerPool { .. })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BoundedFanout { limit } => write!(f, "standard ({limit} concurrent)"),
            Strategy::WorkerPool { workers } => write!(f, "with worker pool ({workers} workers)"),
        }
    }
}

/// Strategy plus optional per-endpoint pacing for the login phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPlan {
    pub strategy: Strategy,
    pub rate_limit: Option<Duration>,
}

impl fmt::Display for LoginPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rate_limit, self.strategy.is_pool()) {
            (Some(d), true) => write!(f, "delayed with worker pool ({} ms)", d.as_millis()),
            (Some(d), false) => write!(f, "delayed ({} ms)", d.as_millis()),
            (None, true) => write!(f, "fast with worker pool"),
            (None, false) => write!(f, "fast (no delay)"),
        }
    }
}

fn select(
    configured: Option<usize>,
    tasks: usize,
    threshold: usize,
    min_workers: usize,
    fanout_limit: usize,
) -> Strategy {
    if configured.is_some() || tasks >= threshold {
        let workers = configured.unwrap_or(0).max(min_workers);
        Strategy::WorkerPool { workers }
    } else {
        Strategy::BoundedFanout {
            limit: fanout_limit,
        }
    }
}

/// Strategy for probing `tasks` endpoints.
pub fn select_live_strategy(cfg: &ScanConfig, tasks: usize) -> Strategy {
    select(
        cfg.live_workers(),
        tasks,
        LIVE_POOL_THRESHOLD,
        LIVE_MIN_WORKERS,
        cfg.fanout_limit(),
    )
}

/// Strategy and pacing for testing `tasks` login attempts.
pub fn select_login_plan(cfg: &ScanConfig, tasks: usize) -> LoginPlan {
    let strategy = select(
        cfg.login_workers(),
        tasks,
        LOGIN_POOL_THRESHOLD,
        LOGIN_MIN_WORKERS,
        cfg.fanout_limit(),
    );
    let rate_limit = (cfg.delay_ms > 0).then(|| login_delay(strategy, cfg.delay()));
    LoginPlan {
        strategy,
        rate_limit,
    }
}

fn login_delay(strategy: Strategy, configured: Duration) -> Duration {
    match strategy {
        Strategy::BoundedFanout { .. } => configured.max(FANOUT_MIN_DELAY),
        Strategy::WorkerPool { .. } if configured.is_zero() => POOL_DEFAULT_DELAY,
        Strategy::WorkerPool { .. } => configured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_live_phase_uses_fanout() {
        let cfg = ScanConfig::default();
        assert_eq!(
            select_live_strategy(&cfg, 499),
            Strategy::BoundedFanout { limit: 10 }
        );
    }

    #[test]
    fn live_threshold_selects_floored_pool() {
        let cfg = ScanConfig::default();
        assert_eq!(
            select_live_strategy(&cfg, 500),
            Strategy::WorkerPool { workers: 50 }
        );
    }

    #[test]
    fn explicit_workers_force_pool_with_floor() {
        let cfg = ScanConfig {
            workers: Some(3),
            ..ScanConfig::default()
        };
        assert_eq!(select_live_strategy(&cfg, 1), Strategy::WorkerPool { workers: 50 });
        assert_eq!(
            select_login_plan(&cfg, 1).strategy,
            Strategy::WorkerPool { workers: 10 }
        );

        let cfg = ScanConfig {
            workers_login: Some(64),
            ..ScanConfig::default()
        };
        assert_eq!(
            select_login_plan(&cfg, 1).strategy,
            Strategy::WorkerPool { workers: 64 }
        );
        assert!(!select_live_strategy(&cfg, 1).is_pool());
    }

    #[test]
    fn login_threshold() {
        let cfg = ScanConfig::default();
        assert!(!select_login_plan(&cfg, 99).strategy.is_pool());
        assert!(select_login_plan(&cfg, 100).strategy.is_pool());
    }

    #[test]
    fn delay_enables_rate_limit_independently_of_strategy() {
        let cfg = ScanConfig {
            delay_ms: 50,
            ..ScanConfig::default()
        };
        let plan = select_login_plan(&cfg, 5);
        assert!(!plan.strategy.is_pool());
        assert_eq!(plan.rate_limit, Some(FANOUT_MIN_DELAY));

        let plan = select_login_plan(&cfg, 500);
        assert!(plan.strategy.is_pool());
        assert_eq!(plan.rate_limit, Some(Duration::from_millis(50)));

        let cfg = ScanConfig {
            delay_ms: 1_000,
            ..ScanConfig::default()
        };
        assert_eq!(
            select_login_plan(&cfg, 5).rate_limit,
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn no_delay_means_no_rate_limit() {
        let cfg = ScanConfig::default();
        assert_eq!(select_login_plan(&cfg, 5).rate_limit, None);
        assert_eq!(select_login_plan(&cfg, 500).rate_limit, None);
    }

    #[test]
    fn pool_default_delay_applies_to_zero() {
        let pool = Strategy::WorkerPool { workers: 10 };
        assert_eq!(login_delay(pool, Duration::ZERO), POOL_DEFAULT_DELAY);
    }

    #[test]
    fn plan_labels() {
        let plan = LoginPlan {
            strategy: Strategy::WorkerPool { workers: 10 },
            rate_limit: Some(Duration::from_millis(400)),
        };
        assert_eq!(plan.to_string(), "delayed with worker pool (400 ms)");
        let plan = LoginPlan {
            strategy: Strategy::BoundedFanout { limit: 10 },
            rate_limit: None,
        };
        assert_eq!(plan.to_string(), "fast (no delay)");
    }
}
