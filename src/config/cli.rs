use crate::config::paths;
use crate::core::probe::DEFAULT_PROBE_TIMEOUT_SECS;
use crate::core::session::SessionOptions;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "cnc", version)]
#[command(about = "Wake a high-power host through a proxy and open an SSH session to it")]
pub struct CliConfig {
    /// Host to connect to (defaults to `default_host`, else a menu)
    pub host: Option<String>,

    /// Path to the YAML, TOML or JSON configuration file
    #[arg(short, long, env = paths::CONFIG_ENV_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List configured hosts with their status and exit
    #[arg(short, long, conflicts_with_all = ["host", "status"])]
    pub list: bool,

    /// Report whether the host is up without waking or connecting
    #[arg(long)]
    pub status: bool,

    /// Fail instead of waking an offline host
    #[arg(long)]
    pub no_wake: bool,

    /// Wake and wait, but do not open a session
    #[arg(long)]
    pub no_connect: bool,

    /// Seconds to wait for a woken host (overrides `wake.timeout_secs`)
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,

    /// Seconds `nc` waits for the probed port
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout: u64,

    /// Print the commands that would run without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Extra arguments for the final `ssh` call (after `--`)
    #[arg(last = true, value_name = "SSH_ARGS")]
    pub ssh_args: Vec<String>,
}

impl CliConfig {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            status_only: self.status,
            no_wake: self.no_wake,
            no_connect: self.no_connect,
            dry_run: self.dry_run,
            wake_timeout: self.wait.map(Duration::from_secs),
            probe_timeout_secs: self.probe_timeout,
            ssh_args: self.ssh_args.clone(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validate_path("config", &path.to_string_lossy())?;
        }
        validate_positive_number("probe_timeout", self.probe_timeout, 1)?;
        if let Some(wait) = self.wait {
            validate_positive_number("wait", wait, 1)?;
        }
        Ok(())
    }
}
