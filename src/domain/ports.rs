use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;

/// A program plus its arguments, never passed through a local shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'') {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// What a captured command left behind. `status` is `None` when the process
/// was killed by a signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn exit(code: i32) -> Self {
        Self {
            status: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn describe_status(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external commands on behalf of the probe, wake and connect steps.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion with stdout and stderr captured.
    async fn output(&self, command: &CommandLine) -> Result<CommandOutput>;

    /// Runs with the terminal handed over and returns the exit code.
    async fn interactive(&self, command: &CommandLine) -> Result<i32>;
}
