//! Process execution with a hard timeout

use async_trait::async_trait;
use lts_errors::PlatformError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Command builder
///
/// When an environment is set with [`PlatformCommand::env_clear_and_set`] the
/// child sees exactly that mapping and nothing inherited.
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Option<BTreeMap<String, String>>,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            env: None,
        }
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Replace the inherited environment with `env`
    pub fn env_clear_and_set(&mut self, env: BTreeMap<String, String>) -> &mut Self {
        self.env = Some(env);
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    #[must_use]
    pub fn get_env(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Output from command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
    /// Terminating signal on unix
    pub signal: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    fn from_status(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            code: status.code(),
            signal: exit_signal(status),
            stdout,
            stderr,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Run `cmd` to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Returns `ProcessExecutionFailed` if the process cannot be spawned or
    /// awaited, and `ProcessTimedOut` if it runs longer than `timeout`. A
    /// timed-out process is killed before this returns.
    async fn execute_command(
        &self,
        cmd: &PlatformCommand,
        timeout: Duration,
    ) -> Result<CommandOutput, PlatformError>;
}

/// Process execution backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessOperations;

impl TokioProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessOperations for TokioProcessOperations {
    async fn execute_command(
        &self,
        cmd: &PlatformCommand,
        timeout: Duration,
    ) -> Result<CommandOutput, PlatformError> {
        let start = Instant::now();
        let name = cmd.display_name();

        let mut command = Command::new(cmd.program());
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        if let Some(env) = cmd.get_env() {
            command.env_clear();
            command.envs(env);
        }

        let child = command
            .spawn()
            .map_err(|e| PlatformError::ProcessExecutionFailed {
                command: name.clone(),
                message: e.to_string(),
            })?;

        // Dropping the pending future drops the child, which kills it
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let output = CommandOutput::from_status(output.status, output.stdout, output.stderr);
                tracing::debug!(
                    command = %name,
                    code = ?output.code,
                    signal = ?output.signal,
                    elapsed_ms = start.elapsed().as_millis(),
                    "process finished"
                );
                Ok(output)
            }
            Ok(Err(e)) => Err(PlatformError::ProcessExecutionFailed {
                command: name,
                message: e.to_string(),
            }),
            Err(_) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(command = %name, timeout_ms, "process timed out and was killed");
                Err(PlatformError::ProcessTimedOut {
                    command: name,
                    timeout_ms,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let mut cmd = PlatformCommand::new("/opt/bin/tool");
        cmd.args(["--version", "-a", "-b"]).current_dir("/tmp");
        assert_eq!(cmd.program(), Path::new("/opt/bin/tool"));
        assert_eq!(cmd.get_args(), ["--version", "-a", "-b"]);
        assert_eq!(cmd.get_current_dir(), Some(&PathBuf::from("/tmp")));
        assert!(cmd.get_env().is_none());
    }

    #[test]
    fn test_output_success_requires_zero_code() {
        let ok = CommandOutput {
            code: Some(0),
            ..CommandOutput::default()
        };
        assert!(ok.success());

        let killed = CommandOutput {
            code: None,
            signal: Some(9),
            ..CommandOutput::default()
        };
        assert!(!killed.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let cmd = PlatformCommand::new("/nonexistent/definitely-not-here");
        let err = TokioProcessOperations::new()
            .execute_command(&cmd, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::ProcessExecutionFailed { .. }));
    }
}
