use super::DetectionStrategy;
use crate::domain::context::Context;
use crate::domain::entities::{InstallMethod, InstallPaths};
use crate::domain::errors::{CommandError, InstallResult};
use crate::domain::ports::{CommandRunner, FileManager, Invocation};
use crate::domain::services::method_selection::{binary_alias, is_flatpak_app_id};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Non-zero exit means "not found"; anything else is a real failure.
fn found(result: Result<String, CommandError>) -> InstallResult<Option<String>> {
    match result {
        Ok(stdout) => Ok(Some(stdout)),
        Err(CommandError::Failed { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn query(
    runner: &dyn CommandRunner,
    ctx: &Context,
    invocation: Invocation,
) -> InstallResult<Option<String>> {
    found(runner.run(ctx, invocation).await.map(|output| output.stdout))
}

/// The per-invocation environment every aqua command runs with.
pub fn aqua_environment(paths: &InstallPaths) -> Vec<(String, String)> {
    vec![
        (
            "AQUA_ROOT_DIR".to_string(),
            paths.aqua_root().display().to_string(),
        ),
        (
            "AQUA_GLOBAL_CONFIG".to_string(),
            paths.aqua_config().display().to_string(),
        ),
    ]
}

pub struct FlatpakStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl FlatpakStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DetectionStrategy for FlatpakStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Flatpak
    }

    fn applies_to(&self, name: &str) -> bool {
        is_flatpak_app_id(name)
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("flatpak") {
            return Ok(false);
        }
        let listing = self
            .runner
            .execute_with_output(
                ctx,
                "flatpak",
                &["list", "--user", "--app", "--columns=application"],
            )
            .await?;
        Ok(listing.lines().any(|line| line.trim() == name))
    }
}

pub struct MiseStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl MiseStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn which(&self, ctx: &Context, binary: &str) -> InstallResult<bool> {
        let invocation = Invocation::new("mise").args(["which", binary]);
        Ok(query(self.runner.as_ref(), ctx, invocation).await?.is_some())
    }
}

#[async_trait]
impl DetectionStrategy for MiseStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Mise
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("mise") {
            return Ok(false);
        }
        if self.which(ctx, name).await? {
            return Ok(true);
        }
        match binary_alias(name) {
            Some(alias) => self.which(ctx, alias).await,
            None => Ok(false),
        }
    }
}

pub struct DpkgStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl DpkgStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DetectionStrategy for DpkgStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Apt
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("dpkg-query") {
            return Ok(false);
        }
        let invocation = Invocation::new("dpkg-query").args(["-W", "-f=${Status}", name]);
        let status = query(self.runner.as_ref(), ctx, invocation).await?;
        Ok(status.is_some_and(|s| s.contains("install ok installed")))
    }
}

pub struct SnapStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl SnapStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DetectionStrategy for SnapStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Snap
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("snap") {
            return Ok(false);
        }
        let invocation = Invocation::new("snap").args(["list", name]);
        Ok(query(self.runner.as_ref(), ctx, invocation).await?.is_some())
    }
}

pub struct AquaStrategy {
    runner: Arc<dyn CommandRunner>,
    env: Vec<(String, String)>,
}

impl AquaStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>, paths: &InstallPaths) -> Self {
        Self {
            runner,
            env: aqua_environment(paths),
        }
    }
}

#[async_trait]
impl DetectionStrategy for AquaStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Aqua
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("aqua") {
            return Ok(false);
        }
        let invocation = Invocation::new("aqua").args(["which", name]).envs(&self.env);
        Ok(query(self.runner.as_ref(), ctx, invocation).await?.is_some())
    }
}

/// An executable on the search path or in the user's local bin directory.
pub struct PathStrategy {
    runner: Arc<dyn CommandRunner>,
    files: Arc<dyn FileManager>,
    local_bin: PathBuf,
}

impl PathStrategy {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileManager>,
        paths: &InstallPaths,
    ) -> Self {
        Self {
            runner,
            files,
            local_bin: paths.local_bin.clone(),
        }
    }
}

#[async_trait]
impl DetectionStrategy for PathStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Binary
    }

    async fn probe(&self, _ctx: &Context, name: &str) -> InstallResult<bool> {
        if self.runner.command_exists(name) {
            return Ok(true);
        }
        Ok(self.files.file_exists(&self.local_bin.join(name)).await)
    }
}

pub struct RpmStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl RpmStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DetectionStrategy for RpmStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Dnf
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("rpm") {
            return Ok(false);
        }
        let invocation = Invocation::new("rpm").args(["-q", name]);
        Ok(query(self.runner.as_ref(), ctx, invocation).await?.is_some())
    }
}

pub struct PacmanStrategy {
    runner: Arc<dyn CommandRunner>,
}

impl PacmanStrategy {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DetectionStrategy for PacmanStrategy {
    fn method(&self) -> InstallMethod {
        InstallMethod::Pacman
    }

    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        if !self.runner.command_exists("pacman") {
            return Ok(false);
        }
        let invocation = Invocation::new("pacman").args(["-Q", name]);
        Ok(query(self.runner.as_ref(), ctx, invocation).await?.is_some())
    }
}
