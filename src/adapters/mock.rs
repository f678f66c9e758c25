//! Recording runner for tests.
//!
//! `MockRunner` hands out preset responses in order and records every
//! command line it was asked to run. Once the presets run out every command
//! exits 0.

use crate::domain::ports::{CommandLine, CommandOutput, CommandRunner};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Mutex<VecDeque<Result<CommandOutput>>>,
    commands: Mutex<Vec<CommandLine>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<CommandOutput>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a run of plain exit codes.
    pub fn with_exit_codes(codes: &[i32]) -> Self {
        Self::with_responses(codes.iter().map(|&c| Ok(CommandOutput::exit(c))).collect())
    }

    pub fn executed_commands(&self) -> Vec<CommandLine> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Recorded commands rendered as shell-style strings.
    pub fn executed_lines(&self) -> Vec<String> {
        self.executed_commands()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn next(&self, command: &CommandLine) -> Result<CommandOutput> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
            .unwrap_or_else(|| Ok(CommandOutput::exit(0)))
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn output(&self, command: &CommandLine) -> Result<CommandOutput> {
        self.next(command)
    }

    async fn interactive(&self, command: &CommandLine) -> Result<i32> {
        let output = self.next(command)?;
        Ok(output.status.unwrap_or(255))
    }
}
