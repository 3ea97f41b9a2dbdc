//! External diagnostic tool invocation

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of one tool invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program with a hard deadline
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput>;
}

/// Runs programs from `PATH` through tokio's process support
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, command.output()).await {
            Err(_) => Err(AppError::timeout(format!(
                "{} did not finish within {:.1}s",
                program,
                timeout.as_secs_f64()
            ))),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::probe(format!("{} is not installed or not on PATH", program)))
            }
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(output)) => Ok(CommandOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_success() {
        let ok = CommandOutput { exit_code: Some(0), ..Default::default() };
        let failed = CommandOutput { exit_code: Some(1), ..Default::default() };
        let killed = CommandOutput { exit_code: None, ..Default::default() };

        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_probe_error() {
        let runner = SystemCommandRunner;
        let result = runner
            .run("definitely-not-a-real-tool-4821", &[], Duration::from_secs(1))
            .await;

        assert!(matches!(result, Err(AppError::Probe(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let runner = SystemCommandRunner;
        let args = vec!["-c".to_string(), "echo hello; exit 3".to_string()];
        let output = runner.run("sh", &args, Duration::from_secs(5)).await.unwrap();

        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_reported() {
        let runner = SystemCommandRunner;
        let args = vec!["5".to_string()];
        let result = runner.run("sleep", &args, Duration::from_millis(100)).await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
    }
}
