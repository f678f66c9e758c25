use crate::core::ssh;
use crate::domain::model::Host;
use crate::domain::ports::{CommandLine, CommandRunner};
use crate::utils::error::Result;

pub fn connect_command(host: &Host, extra_args: &[String]) -> CommandLine {
    ssh::session(&host.ssh_target(), extra_args)
}

/// Hands the terminal to `ssh` for `host` and returns its exit code.
pub async fn connect<R>(runner: &R, host: &Host, extra_args: &[String]) -> Result<i32>
where
    R: CommandRunner + ?Sized,
{
    let command = connect_command(host, extra_args);
    let code = runner.interactive(&command).await?;
    tracing::debug!("ssh session to {} ended with {}", host.name, code);
    Ok(code)
}
