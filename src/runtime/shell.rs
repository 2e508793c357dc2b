//! Shell command invocation

use crate::error::Result;
use std::fmt;
use std::process::Command;

/// Exit status of a shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    /// Status with the given exit code
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Whether the command exited with zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "signal"),
        }
    }
}

/// Runs a command line through a shell and waits for it
pub trait Shell {
    fn call(&self, command: &str) -> Result<CommandStatus>;
}

/// `sh -c` with inherited stdio
#[derive(Debug, Clone, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn call(&self, command: &str) -> Result<CommandStatus> {
        tracing::debug!("$ {}", command);
        let status = Command::new("sh").arg("-c").arg(command).status()?;
        Ok(CommandStatus {
            code: status.code(),
        })
    }
}
