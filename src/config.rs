use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Connect timeout of one liveness probe.
pub const LIVE_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout of one SSH connect + handshake + password attempt.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Base name of the result files written to the working directory.
pub const DEFAULT_OUTPUT_BASE: &str = "sshchecker_results";

/// Default admission count of the bounded-fanout strategy.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Which result files to write.
#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `<base>.txt` only.
    #[default]
    Text,
    /// `<base>.json` only.
    Json,
    /// Both files.
    All,
}

impl OutputFormat {
    pub fn writes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }

    pub fn writes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::All)
    }
}

/// Everything one run needs. Built once by the caller and handed to
/// [`crate::runner::Checker::new`] by reference.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanConfig {
    pub hosts: Vec<String>,
    pub ports: Vec<String>,
    pub users: Vec<String>,
    pub passwords: Vec<String>,
    /// Admission count of the bounded-fanout strategy; zero falls back to the default.
    pub chunk_size: usize,
    /// Minimum pause between two login attempts against the same endpoint; zero disables it.
    pub delay_ms: u64,
    /// Global worker count, used for a phase that has no count of its own.
    pub workers: Option<usize>,
    pub workers_live: Option<usize>,
    pub workers_login: Option<usize>,
    pub format: OutputFormat,
    /// Result files are `<output_base>.json` and `<output_base>.txt`.
    pub output_base: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            ports: vec!["22".to_string()],
            users: Vec::new(),
            passwords: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delay_ms: 0,
            workers: None,
            workers_live: None,
            workers_login: None,
            format: OutputFormat::Text,
            output_base: PathBuf::from(DEFAULT_OUTPUT_BASE),
        }
    }
}

impl ScanConfig {
    /// Fanout admission count, never zero.
    pub fn fanout_limit(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    /// Worker count for the liveness phase, falling back to the global count.
    pub fn live_workers(&self) -> Option<usize> {
        positive(self.workers_live).or(positive(self.workers))
    }

    /// Worker count for the login phase, falling back to the global count.
    pub fn login_workers(&self) -> Option<usize> {
        positive(self.workers_login).or(positive(self.workers))
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Reject a config that cannot produce a single login attempt.
    pub fn ensure_inputs(&self) -> Result<()> {
        if self.hosts.is_empty() {
            bail!("no valid hosts provided, use --help for usage information");
        }
        if self.ports.is_empty() {
            bail!("no valid ports provided, use --help for usage information");
        }
        if self.users.is_empty() {
            bail!("no valid usernames provided, use --help for usage information");
        }
        if self.passwords.is_empty() {
            bail!("no valid passwords provided, use --help for usage information");
        }
        Ok(())
    }
}

fn positive(v: Option<usize>) -> Option<usize> {
    v.filter(|n| *n > 0)
}
