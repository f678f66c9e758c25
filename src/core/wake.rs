use crate::core::{probe, ssh};
use crate::domain::model::{Host, ProxyHost, WakeSettings};
use crate::domain::ports::{CommandLine, CommandRunner};
use crate::utils::error::{CncError, Result};
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub const WAKEONLAN_PROGRAM: &str = "wakeonlan";

/// `ssh <proxy> wakeonlan <mac>`
pub fn wake_command(host: &Host, proxy: &ProxyHost) -> CommandLine {
    ssh::remote(
        &proxy.ssh_target(),
        [WAKEONLAN_PROGRAM.to_string(), host.mac.to_string()],
    )
}

/// Has the proxy broadcast a magic packet for `host`.
pub async fn send_wake_on_lan<R>(runner: &R, host: &Host, proxy: &ProxyHost) -> Result<()>
where
    R: CommandRunner + ?Sized,
{
    let command = wake_command(host, proxy);
    let output = runner.output(&command).await?;

    if output.success() {
        tracing::info!("magic packet for {} ({}) sent via {}", host.name, host.mac, proxy.name);
        return Ok(());
    }

    if output.status == Some(ssh::SSH_FAILURE_STATUS) {
        return Err(CncError::ProxyUnreachable {
            proxy: proxy.name.clone(),
            stderr: output.stderr.trim().to_string(),
        });
    }

    Err(CncError::CommandFailed {
        command: command.to_string(),
        status: output.describe_status(),
        stderr: output.stderr.trim().to_string(),
    })
}

/// Polls the probe every `poll_interval` until `host` answers or `timeout`
/// has passed. Returns how long it took.
pub async fn wait_until_online<R>(
    runner: &R,
    host: &Host,
    proxy: &ProxyHost,
    settings: WakeSettings,
    probe_timeout_secs: u64,
) -> Result<Duration>
where
    R: CommandRunner + ?Sized,
{
    let started = Instant::now();

    loop {
        sleep(settings.poll_interval).await;

        if probe::is_host_online(runner, host, proxy, probe_timeout_secs).await? {
            let elapsed = started.elapsed();
            tracing::info!("{} came online after {}s", host.name, elapsed.as_secs());
            return Ok(elapsed);
        }

        let elapsed = started.elapsed();
        if elapsed >= settings.timeout {
            return Err(CncError::WakeTimeout {
                host: host.name.clone(),
                waited: elapsed,
            });
        }
        tracing::debug!("{} still offline after {}s", host.name, elapsed.as_secs());
    }
}
