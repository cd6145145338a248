use crate::domain::context::Context;
use crate::domain::errors::CommandError;
use async_trait::async_trait;
use std::fmt;

/// A single process invocation, including any environment overlay that
/// applies to this process only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub privileged: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            privileged: false,
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    /// Human-readable command line, without the environment overlay.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        if self.privileged {
            parts.push("sudo");
        }
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, ctx: &Context, invocation: Invocation) -> Result<CommandOutput, CommandError>;

    fn command_exists(&self, name: &str) -> bool;

    async fn execute(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), CommandError> {
        self.run(ctx, Invocation::new(program).args(args.iter().copied()))
            .await
            .map(|_| ())
    }

    async fn execute_with_output(
        &self,
        ctx: &Context,
        program: &str,
        args: &[&str],
    ) -> Result<String, CommandError> {
        self.run(ctx, Invocation::new(program).args(args.iter().copied()))
            .await
            .map(|output| output.stdout)
    }

    async fn execute_sudo(&self, ctx: &Context, program: &str, args: &[&str]) -> Result<(), CommandError> {
        self.run(
            ctx,
            Invocation::new(program).args(args.iter().copied()).privileged(),
        )
        .await
        .map(|_| ())
    }

    async fn execute_with_env(
        &self,
        ctx: &Context,
        env: &[(String, String)],
        program: &str,
        args: &[&str],
    ) -> Result<String, CommandError> {
        self.run(
            ctx,
            Invocation::new(program).args(args.iter().copied()).envs(env),
        )
        .await
        .map(|output| output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_shows_sudo_but_not_env() {
        let invocation = Invocation::new("apt-get")
            .args(["install", "-y", "vim"])
            .env("http_proxy", "http://proxy:3128")
            .privileged();
        assert_eq!(invocation.command_line(), "sudo apt-get install -y vim");
        assert_eq!(invocation.env.len(), 1);
    }
}
