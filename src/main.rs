use std::path::PathBuf;
use std::sync::Arc;

use ssh_check_rs::auth::SshAuthenticator;
use ssh_check_rs::config::{OutputFormat, ScanConfig, DEFAULT_CHUNK_SIZE};
use ssh_check_rs::runner::{Checker, RunOutcome};
use ssh_check_rs::{hosts, inputs, logging, ports};

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

/// ssh-check-rs — find reachable SSH endpoints and test username/password pairs against them.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ssh-check-rs",
    version,
    about = "Find reachable SSH endpoints and test username/password pairs against them.",
    long_about = None
)]
struct Cli {
    /// Host, IP or IPv4 CIDR. Comma-separated for several.
    #[arg(long)]
    host: Option<String>,

    /// File with one host, IP or CIDR per line. Ignored when --host is given.
    #[arg(long = "host-file")]
    host_file: Option<PathBuf>,

    /// Port or port range. Comma-separated for several. Defaults to 22.
    #[arg(long)]
    port: Option<String>,

    /// File with one port per line. Ignored when --port is given.
    #[arg(long = "port-file")]
    port_file: Option<PathBuf>,

    /// Username. Comma-separated for several.
    #[arg(long)]
    user: Option<String>,

    /// File with one username per line. Ignored when --user is given.
    #[arg(long = "user-file")]
    user_file: Option<PathBuf>,

    /// Password. Comma-separated for several.
    #[arg(long)]
    pass: Option<String>,

    /// File with one password per line. Ignored when --pass is given.
    #[arg(long = "pass-file")]
    pass_file: Option<PathBuf>,

    /// Max concurrent attempts in standard (non-pool) mode.
    #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Delay in milliseconds between login attempts against the same host:port.
    #[arg(long, default_value_t = 0)]
    delay: u64,

    /// Worker count for both phases; switches them to worker-pool mode.
    #[arg(long)]
    workers: Option<usize>,

    /// Worker count for the live host check.
    #[arg(long = "workers-live")]
    workers_live: Option<usize>,

    /// Worker count for the SSH login check.
    #[arg(long = "workers-login")]
    workers_login: Option<usize>,

    /// Which result files to write.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log unreachable hosts and rejected logins too.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    async fn into_config(self) -> Result<ScanConfig> {
        let raw_hosts = inputs::from_value_or_file(self.host.as_deref(), self.host_file.as_deref())?;
        let raw_ports = inputs::from_value_or_file(self.port.as_deref(), self.port_file.as_deref())?;
        let users = inputs::from_value_or_file(self.user.as_deref(), self.user_file.as_deref())?;
        let passwords =
            inputs::from_value_or_file(self.pass.as_deref(), self.pass_file.as_deref())?;

        let mut ports = ports::normalize_ports(&raw_ports);
        if ports.is_empty() {
            ports.push("22".to_string());
        }

        Ok(ScanConfig {
            hosts: hosts::normalize_hosts(&raw_hosts).await,
            ports,
            users,
            passwords,
            chunk_size: self.chunk_size,
            delay_ms: self.delay,
            workers: self.workers,
            workers_live: self.workers_live,
            workers_login: self.workers_login,
            format: self.format,
            ..ScanConfig::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = cli.into_config().await?;
    config.ensure_inputs()?;

    info!("ssh-check-rs configuration:");
    info!("  hosts        : {}", config.hosts.len());
    info!("  ports        : {}", config.ports.join(","));
    info!("  users        : {}", config.users.len());
    info!("  passwords    : {}", config.passwords.len());
    info!("  chunk_size   : {}", config.fanout_limit());
    info!("  delay_ms     : {}", config.delay_ms);
    info!("  format       : {:?}", config.format);
    debug!("full config: {}", serde_json::to_string(&config)?);

    let mut checker = Checker::new(&config, Arc::new(SshAuthenticator));
    match checker.run().await? {
        RunOutcome::Found { logins } => info!("Done: {logins} valid logins recorded."),
        RunOutcome::NoLiveHosts | RunOutcome::NoValidLogins => {}
    }

    Ok(())
}
