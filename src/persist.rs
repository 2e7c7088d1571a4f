use crate::config::OutputFormat;
use crate::types::CredentialAttempt;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// JSON snapshot contents: result key to credential record.
pub type Snapshot = BTreeMap<String, CredentialAttempt>;

/// Writes discovered credentials to `<base>.json` and/or `<base>.txt`.
///
/// Failures are logged and swallowed; the in-memory result set stays the
/// source of truth for the rest of the run.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    base: PathBuf,
    format: OutputFormat,
}

impl ResultWriter {
    pub fn new(base: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            base: base.into(),
            format,
        }
    }

    pub fn json_path(&self) -> PathBuf {
        with_suffix(&self.base, ".json")
    }

    pub fn text_path(&self) -> PathBuf {
        with_suffix(&self.base, ".txt")
    }

    /// Persist one fresh discovery.
    pub fn save_one(&self, login: &CredentialAttempt) {
        self.save(std::slice::from_ref(login), false);
    }

    /// Persist every known login at the end of the run.
    pub fn save_all(&self, logins: &[CredentialAttempt]) {
        self.save(logins, true);
    }

    /// [`ResultWriter::save_one`] on the blocking pool, for async callers.
    pub async fn persist_one(&self, login: CredentialAttempt) {
        let writer = self.clone();
        self.off_runtime(move || writer.save_one(&login)).await;
    }

    /// [`ResultWriter::save_all`] on the blocking pool, for async callers.
    pub async fn persist_all(&self, logins: Vec<CredentialAttempt>) {
        let writer = self.clone();
        self.off_runtime(move || writer.save_all(&logins)).await;
    }

    async fn off_runtime<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = tokio::task::spawn_blocking(job).await {
            error!("Result save task failed for {}: {e}", self.base.display());
        }
    }

    fn save(&self, logins: &[CredentialAttempt], announce: bool) {
        if self.format.writes_json() {
            let path = self.json_path();
            match merge_into_json(&path, logins) {
                Ok(_) if announce => info!("Results saved to {}", path.display()),
                Ok(_) => {}
                Err(e) => error!("Error saving results to JSON: {e:#}"),
            }
        }
        if self.format.writes_text() {
            let path = self.text_path();
            match append_lines(&path, logins) {
                Ok(()) if announce => info!("Results saved to {}", path.display()),
                Ok(()) => {}
                Err(e) => error!("Error saving results to text file: {e:#}"),
            }
        }
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Read the snapshot at `path`, or an empty one if the file does not exist.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Merge `logins` into the snapshot at `path` and rewrite it.
///
/// Existing keys are never overwritten. Returns the number of records added.
pub fn merge_into_json(path: &Path, logins: &[CredentialAttempt]) -> Result<usize> {
    let mut snapshot = load_snapshot(path)?;
    let mut added = 0;
    for login in logins {
        if let std::collections::btree_map::Entry::Vacant(slot) = snapshot.entry(login.result_key())
        {
            slot.insert(login.clone());
            added += 1;
        }
    }
    let data = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(added)
}

/// Append one `address:port | user | password` line per login.
pub fn append_lines(path: &Path, logins: &[CredentialAttempt]) -> Result<()> {
    if logins.is_empty() {
        return Ok(());
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut buf = String::new();
    for login in logins {
        buf.push_str(&login.to_line());
        buf.push('\n');
    }
    file.write_all(buf.as_bytes())
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}
