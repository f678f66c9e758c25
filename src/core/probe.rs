use crate::core::ssh;
use crate::domain::model::{Host, ProxyHost};
use crate::domain::ports::{CommandLine, CommandRunner};
use crate::utils::error::{CncError, Result};

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// `ssh <proxy> nc -z -w <timeout> <host> <port>`
pub fn probe_command(host: &Host, proxy: &ProxyHost, timeout_secs: u64) -> CommandLine {
    ssh::remote(
        &proxy.ssh_target(),
        [
            "nc".to_string(),
            "-z".to_string(),
            "-w".to_string(),
            timeout_secs.to_string(),
            host.address(),
            host.probe_port().to_string(),
        ],
    )
}

/// Asks the proxy whether `host` accepts TCP connections on its port.
///
/// `nc` exiting non-zero means offline. `ssh` itself exiting 255 means the
/// proxy could not be reached, which is an error rather than an answer.
pub async fn is_host_online<R>(
    runner: &R,
    host: &Host,
    proxy: &ProxyHost,
    timeout_secs: u64,
) -> Result<bool>
where
    R: CommandRunner + ?Sized,
{
    let command = probe_command(host, proxy, timeout_secs);
    let output = runner.output(&command).await?;

    if output.status == Some(ssh::SSH_FAILURE_STATUS) {
        return Err(CncError::ProxyUnreachable {
            proxy: proxy.name.clone(),
            stderr: output.stderr.trim().to_string(),
        });
    }

    let online = output.success();
    tracing::debug!(
        "{}:{} via {} is {}",
        host.address(),
        host.probe_port(),
        proxy.name,
        if online { "online" } else { "offline" }
    );
    Ok(online)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockRunner;
    use crate::domain::ports::CommandOutput;

    fn fixtures() -> (Host, ProxyHost) {
        let host = Host {
            name: "tower".to_string(),
            mac: "aa:bb:cc:dd:ee:ff".parse().unwrap(),
            port: None,
            proxy: "pi".to_string(),
            ip: None,
            user: None,
        };
        let proxy = ProxyHost {
            name: "pi".to_string(),
            port: None,
            ip: None,
            user: None,
        };
        (host, proxy)
    }

    #[test]
    fn test_probe_command_shape() {
        let (mut host, mut proxy) = fixtures();
        assert_eq!(
            probe_command(&host, &proxy, 5).to_string(),
            "ssh pi nc -z -w 5 tower 22"
        );

        host.ip = Some("10.0.0.9".parse().unwrap());
        host.port = Some(2222);
        proxy.user = Some("admin".to_string());
        proxy.port = Some(2200);
        assert_eq!(
            probe_command(&host, &proxy, 2).to_string(),
            "ssh -p 2200 admin@pi nc -z -w 2 10.0.0.9 2222"
        );
    }

    #[tokio::test]
    async fn test_exit_status_decides_liveness() {
        let (host, proxy) = fixtures();
        let runner = MockRunner::with_exit_codes(&[0, 1]);

        assert!(is_host_online(&runner, &host, &proxy, 5).await.unwrap());
        assert!(!is_host_online(&runner, &host, &proxy, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_an_error() {
        let (host, proxy) = fixtures();
        let runner = MockRunner::with_responses(vec![Ok(CommandOutput::exit(255)
            .with_stderr("ssh: connect to host pi port 22: No route to host\n"))]);

        let err = is_host_online(&runner, &host, &proxy, 5).await.unwrap_err();
        match err {
            CncError::ProxyUnreachable { proxy, stderr } => {
                assert_eq!(proxy, "pi");
                assert_eq!(stderr, "ssh: connect to host pi port 22: No route to host");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
