use crate::domain::context::Context;
use crate::domain::errors::CommandError;
use crate::domain::ports::{CommandOutput, CommandRunner, Invocation};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Runs invocations as real child processes.
///
/// Privileged invocations go through `sudo`; their environment overlay is
/// passed as `env KEY=VALUE` arguments because sudo resets the environment of
/// the target process.
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(invocation: &Invocation) -> Command {
        let mut command = if invocation.privileged {
            let mut command = Command::new("sudo");
            if !invocation.env.is_empty() {
                command.arg("env");
                for (key, value) in &invocation.env {
                    command.arg(format!("{}={}", key, value));
                }
            }
            command.arg(&invocation.program);
            command
        } else {
            let mut command = Command::new(&invocation.program);
            for (key, value) in &invocation.env {
                command.env(key, value);
            }
            command
        };

        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn interpret_status(
        command_line: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    ) -> Result<CommandOutput, CommandError> {
        if status.success() {
            return Ok(CommandOutput { stdout, stderr });
        }

        if let Some(code) = status.code() {
            return Err(CommandError::Failed {
                command: command_line,
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal().unwrap_or(-1)
        };
        #[cfg(not(unix))]
        let signal = -1;

        Err(CommandError::Signaled {
            command: command_line,
            signal,
        })
    }
}

impl Default for ProcessCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, ctx: &Context, invocation: Invocation) -> Result<CommandOutput, CommandError> {
        let command_line = invocation.command_line();
        tracing::debug!("Running: {}", command_line);

        let mut command = Self::build_command(&invocation);
        let output = match ctx.run(command.output()).await {
            Err(reason) => {
                tracing::debug!("{} interrupted: {}", command_line, reason);
                return Err(CommandError::from_context(command_line, reason));
            }
            Ok(Err(e)) => {
                return Err(CommandError::Spawn {
                    command: command_line,
                    message: e.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::debug!(
            "{} finished with {} ({} bytes stdout)",
            command_line,
            output.status,
            stdout.len()
        );

        Self::interpret_status(command_line, output.status, stdout, stderr)
    }

    fn command_exists(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn captures_stdout_and_env_overlay() {
        let runner = ProcessCommandRunner::new();
        let output = runner
            .run(
                &Context::background(),
                Invocation::new("sh")
                    .args(["-c", "printf '%s' \"$DEVSTRAP_PROBE\""])
                    .env("DEVSTRAP_PROBE", "overlay-only"),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "overlay-only");
        assert!(std::env::var("DEVSTRAP_PROBE").is_err());
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_stderr() {
        let runner = ProcessCommandRunner::new();
        let err = runner
            .execute(&Context::background(), "sh", &["-c", "echo broken >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn signal_is_reported_distinctly() {
        let runner = ProcessCommandRunner::new();
        let err = runner
            .execute(&Context::background(), "sh", &["-c", "kill -9 $$"])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Signaled { signal: 9, .. }));
    }

    #[tokio::test]
    async fn cancellation_stops_the_child_promptly() {
        let runner = ProcessCommandRunner::new();
        let (ctx, handle) = Context::with_cancel();
        let started = Instant::now();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.cancel();
        });
        let err = runner.execute(&ctx, "sleep", &["30"]).await.unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(err, CommandError::Canceled { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn deadline_is_reported_as_timeout() {
        let runner = ProcessCommandRunner::new();
        let ctx = Context::background().with_timeout(Duration::from_millis(100));
        let err = runner.execute(&ctx, "sleep", &["30"]).await.unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let runner = ProcessCommandRunner::new();
        let err = runner
            .execute(&Context::background(), "devstrap-no-such-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
        assert!(!runner.command_exists("devstrap-no-such-binary"));
        assert!(runner.command_exists("sh"));
    }
}
