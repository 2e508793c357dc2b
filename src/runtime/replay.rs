//! Sequential replay of script commands

use super::shell::Shell;
use crate::error::{DupError, Result};
use serde::{Deserialize, Serialize};

/// What to do when a replayed command fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayPolicy {
    /// Ignore the exit status and run the next command
    #[default]
    Continue,
    /// Stop at the first non-zero exit status
    Abort,
}

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Commands run, in order
    pub executed: Vec<String>,
    /// Commands that exited non-zero
    pub failed: Vec<String>,
}

/// Runs commands one at a time through a shell
pub struct Replayer<'a, S: Shell> {
    shell: &'a S,
    policy: ReplayPolicy,
}

impl<'a, S: Shell> Replayer<'a, S> {
    /// Create a replayer
    pub fn new(shell: &'a S, policy: ReplayPolicy) -> Self {
        Self { shell, policy }
    }

    /// Run every command, waiting for each before starting the next
    pub fn run<I>(&self, commands: I) -> Result<ReplayReport>
    where
        I: IntoIterator<Item = String>,
    {
        let mut report = ReplayReport::default();

        for command in commands {
            tracing::info!("Running: {}", command);
            let status = self.shell.call(&command)?;
            report.executed.push(command.clone());

            if status.success() {
                continue;
            }
            match self.policy {
                ReplayPolicy::Continue => {
                    tracing::warn!("Command failed with {}: {}", status, command);
                    report.failed.push(command);
                }
                ReplayPolicy::Abort => {
                    return Err(DupError::CommandFailed {
                        command,
                        status: status.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::shell::testing::RecordingShell;

    fn commands() -> Vec<String> {
        vec!["echo 1".to_string(), "false".to_string(), "echo 2".to_string()]
    }

    #[test]
    fn test_continue_past_failures() {
        let shell = RecordingShell::failing(&["false"]);
        let report = Replayer::new(&shell, ReplayPolicy::Continue)
            .run(commands())
            .unwrap();

        assert_eq!(shell.calls(), commands());
        assert_eq!(report.executed, commands());
        assert_eq!(report.failed, vec!["false".to_string()]);
    }

    #[test]
    fn test_abort_on_failure() {
        let shell = RecordingShell::failing(&["false"]);
        let result = Replayer::new(&shell, ReplayPolicy::Abort).run(commands());

        assert!(matches!(result, Err(DupError::CommandFailed { .. })));
        assert_eq!(shell.calls(), vec!["echo 1", "false"]);
    }
}
