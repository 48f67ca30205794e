//! External process invocation (privilege elevation, named-checkzone, reload).
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ZoneError;

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best available diagnostic: stderr, else stdout, else the exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".into(),
        }
    }
}

/// Runs an argv to completion. A non-zero exit is not an error here; callers
/// decide what it means.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ZoneError>;
}

/// Spawns real processes, killing any that outlive `timeout`.
#[derive(Clone, Debug)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ZoneError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ZoneError::invalid("empty command line"))?;
        let command_line = argv.join(" ");
        debug!(command = %command_line, "running external command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    ZoneError::PermissionDenied(format!("cannot execute {program}: {e}"))
                }
                _ => ZoneError::io(format!("failed to spawn {program}"), e),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ZoneError::Timeout {
                command: command_line.clone(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| ZoneError::io(format!("failed to wait for {program}"), e))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %command_line, code = ?result.code, "external command finished");
        Ok(result)
    }
}
