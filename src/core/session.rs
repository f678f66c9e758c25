use crate::core::{connect, probe, wake};
use crate::domain::model::{CncConfig, Host};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{CncError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Only report whether the host is up.
    pub status_only: bool,
    pub no_wake: bool,
    pub no_connect: bool,
    pub dry_run: bool,
    pub wake_timeout: Option<Duration>,
    pub probe_timeout_secs: u64,
    /// Passed to the final `ssh` call.
    pub ssh_args: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            status_only: false,
            no_wake: false,
            no_connect: false,
            dry_run: false,
            wake_timeout: None,
            probe_timeout_secs: probe::DEFAULT_PROBE_TIMEOUT_SECS,
            ssh_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Host answered the probe; nothing else was asked for.
    Online,
    Offline,
    /// Host was woken and answered after the given time; no session opened.
    Woken(Duration),
    /// The `ssh` session ran and exited with this code.
    Connected(i32),
    DryRun,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Connected(code) => *code,
            Outcome::Offline => 1,
            Outcome::Online | Outcome::Woken(_) | Outcome::DryRun => 0,
        }
    }
}

/// One line of `--list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    Online,
    Offline,
    /// The host's proxy could not be reached, so its state is unknown.
    Unreachable { proxy: String, reason: String },
}

pub struct CncSession<R: CommandRunner> {
    runner: R,
    config: CncConfig,
}

impl<R: CommandRunner> CncSession<R> {
    pub fn new(runner: R, config: CncConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &CncConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Probe, wake and wait if needed, then connect.
    pub async fn run(&self, host: &Host, options: &SessionOptions) -> Result<Outcome> {
        let proxy = self.config.proxy_for(host)?;
        let settings = match options.wake_timeout {
            Some(timeout) => self.config.wake().with_timeout(timeout),
            None => self.config.wake(),
        };

        if options.dry_run {
            println!("🔍 Dry run for {} via {}:", host.name, proxy.name);
            println!(
                "  probe:   {}",
                probe::probe_command(host, proxy, options.probe_timeout_secs)
            );
            if !options.status_only {
                if !options.no_wake {
                    println!("  wake:    {}", wake::wake_command(host, proxy));
                    println!(
                        "  wait:    every {}s, up to {}s",
                        settings.poll_interval.as_secs(),
                        settings.timeout.as_secs()
                    );
                }
                if !options.no_connect {
                    println!(
                        "  connect: {}",
                        connect::connect_command(host, &options.ssh_args)
                    );
                }
            }
            return Ok(Outcome::DryRun);
        }

        let online =
            probe::is_host_online(&self.runner, host, proxy, options.probe_timeout_secs).await?;
        tracing::info!("{} is {}", host.name, if online { "online" } else { "offline" });

        if options.status_only {
            return Ok(if online { Outcome::Online } else { Outcome::Offline });
        }

        let mut woken = None;
        if !online {
            if options.no_wake {
                return Err(CncError::HostOffline {
                    host: host.name.clone(),
                });
            }

            println!("⏰ Waking up {}...", host.name);
            wake::send_wake_on_lan(&self.runner, host, proxy).await?;
            let elapsed = wake::wait_until_online(
                &self.runner,
                host,
                proxy,
                settings,
                options.probe_timeout_secs,
            )
            .await?;
            println!("✅ {} is up after {}s", host.name, elapsed.as_secs());
            woken = Some(elapsed);
        }

        if options.no_connect {
            return Ok(woken.map_or(Outcome::Online, Outcome::Woken));
        }

        println!("🔗 Connecting to {}...", host.name);
        let code = connect::connect(&self.runner, host, &options.ssh_args).await?;
        Ok(Outcome::Connected(code))
    }

    /// Every configured host with its current liveness, in file order.
    ///
    /// A dead proxy only marks its own hosts; any other failure aborts the list.
    pub async fn host_statuses(
        &self,
        probe_timeout_secs: u64,
    ) -> Result<Vec<(&Host, HostStatus)>> {
        let mut statuses = Vec::with_capacity(self.config.hosts().len());
        for host in self.config.hosts() {
            let proxy = self.config.proxy_for(host)?;
            let probed =
                probe::is_host_online(&self.runner, host, proxy, probe_timeout_secs).await;
            let status = match probed {
                Ok(true) => HostStatus::Online,
                Ok(false) => HostStatus::Offline,
                Err(CncError::ProxyUnreachable { proxy, stderr }) => {
                    tracing::warn!("{}: proxy {} unreachable: {}", host.name, proxy, stderr);
                    HostStatus::Unreachable {
                        proxy,
                        reason: stderr,
                    }
                }
                Err(e) => return Err(e),
            };
            statuses.push((host, status));
        }
        Ok(statuses)
    }
}
