use crate::domain::ports::{CommandLine, CommandOutput, CommandRunner};
use crate::utils::error::{CncError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Exit code reported when `ssh` is killed by a signal instead of exiting.
const SIGNALLED_EXIT_CODE: i32 = 255;

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(command: &CommandLine) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd
    }

    fn spawn_error(command: &CommandLine, source: std::io::Error) -> CncError {
        CncError::SpawnError {
            program: command.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, command: &CommandLine) -> Result<CommandOutput> {
        tracing::debug!("running: {}", command);

        let output = Self::command(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Self::spawn_error(command, e))?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!("{} -> {}", command.program, result.describe_status());
        Ok(result)
    }

    async fn interactive(&self, command: &CommandLine) -> Result<i32> {
        tracing::debug!("handing terminal to: {}", command);

        let status = Self::command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Self::spawn_error(command, e))?;

        Ok(status.code().unwrap_or(SIGNALLED_EXIT_CODE))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_output_captures_streams_and_status() {
        let cmd = CommandLine::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemRunner.output(&cmd).await.unwrap();

        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_interactive_returns_exit_code() {
        let cmd = CommandLine::new("sh").args(["-c", "exit 7"]);
        assert_eq!(SystemRunner.interactive(&cmd).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let cmd = CommandLine::new("cnc-test-no-such-program");
        let err = SystemRunner.output(&cmd).await.unwrap_err();
        assert!(
            matches!(err, CncError::SpawnError { ref program, .. } if program == "cnc-test-no-such-program")
        );
    }
}
