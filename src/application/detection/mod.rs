//! Answers "is this installed?" without reinstalling anything.
//!
//! [`DetectionCascade`] asks a fixed, ordered list of strategies and stops at
//! the first positive answer. [`MethodChecks`] skips the cascade and asks the
//! one strategy that matches a known installation method.

mod strategies;

pub use strategies::{
    AquaStrategy, DpkgStrategy, FlatpakStrategy, MiseStrategy, PacmanStrategy, PathStrategy,
    RpmStrategy, SnapStrategy, aqua_environment,
};

use crate::domain::context::Context;
use crate::domain::entities::{InstallMethod, InstallPaths};
use crate::domain::errors::InstallResult;
use crate::domain::ports::{CommandRunner, FileManager};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DetectionStrategy: Send + Sync {
    /// The method reported when this strategy finds the package.
    fn method(&self) -> InstallMethod;

    /// Whether the strategy should be consulted for `name` inside the cascade.
    fn applies_to(&self, _name: &str) -> bool {
        true
    }

    /// `Ok(false)` means absent; errors are reserved for probes that could not run.
    async fn probe(&self, ctx: &Context, name: &str) -> InstallResult<bool>;
}

pub struct DetectionCascade {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl DetectionCascade {
    pub fn new(strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Flatpak, mise, dpkg, snap, aqua, then the search path.
    pub fn standard(
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileManager>,
        paths: &InstallPaths,
    ) -> Self {
        Self::new(vec![
            Box::new(FlatpakStrategy::new(Arc::clone(&runner))),
            Box::new(MiseStrategy::new(Arc::clone(&runner))),
            Box::new(DpkgStrategy::new(Arc::clone(&runner))),
            Box::new(SnapStrategy::new(Arc::clone(&runner))),
            Box::new(AquaStrategy::new(Arc::clone(&runner), paths)),
            Box::new(PathStrategy::new(runner, files, paths)),
        ])
    }

    pub fn methods(&self) -> Vec<InstallMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// The method of the first strategy that finds `name`.
    pub async fn detect(&self, ctx: &Context, name: &str) -> Option<InstallMethod> {
        for strategy in &self.strategies {
            if ctx.is_done() {
                tracing::debug!("Detection of {} stopped: context done", name);
                return None;
            }
            if !strategy.applies_to(name) {
                continue;
            }

            match strategy.probe(ctx, name).await {
                Ok(true) => {
                    tracing::debug!("{} detected via {}", name, strategy.method());
                    return Some(strategy.method());
                }
                Ok(false) => {}
                Err(e) => {
                    if ctx.is_done() {
                        return None;
                    }
                    tracing::debug!("{} probe for {} failed: {}", strategy.method(), name, e);
                }
            }
        }
        None
    }

    pub async fn is_installed(&self, ctx: &Context, name: &str) -> bool {
        self.detect(ctx, name).await.is_some()
    }
}

/// Direct per-method checks, bypassing the cascade order.
pub struct MethodChecks {
    flatpak: FlatpakStrategy,
    mise: MiseStrategy,
    dpkg: DpkgStrategy,
    snap: SnapStrategy,
    aqua: AquaStrategy,
    path: PathStrategy,
    rpm: RpmStrategy,
    pacman: PacmanStrategy,
}

impl MethodChecks {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileManager>,
        paths: &InstallPaths,
    ) -> Self {
        Self {
            flatpak: FlatpakStrategy::new(Arc::clone(&runner)),
            mise: MiseStrategy::new(Arc::clone(&runner)),
            dpkg: DpkgStrategy::new(Arc::clone(&runner)),
            snap: SnapStrategy::new(Arc::clone(&runner)),
            aqua: AquaStrategy::new(Arc::clone(&runner), paths),
            rpm: RpmStrategy::new(Arc::clone(&runner)),
            pacman: PacmanStrategy::new(Arc::clone(&runner)),
            path: PathStrategy::new(runner, files, paths),
        }
    }

    pub async fn check(&self, ctx: &Context, name: &str, method: InstallMethod) -> InstallResult<bool> {
        let strategy: &dyn DetectionStrategy = match method.normalized() {
            InstallMethod::Apt | InstallMethod::Deb => &self.dpkg,
            InstallMethod::Snap => &self.snap,
            InstallMethod::Flatpak => &self.flatpak,
            InstallMethod::Mise => &self.mise,
            InstallMethod::Aqua => &self.aqua,
            InstallMethod::Dnf | InstallMethod::Yum | InstallMethod::Zypper => &self.rpm,
            InstallMethod::Pacman => &self.pacman,
            InstallMethod::Binary
            | InstallMethod::Script
            | InstallMethod::GitHub
            | InstallMethod::GitHubBinary
            | InstallMethod::GitHubBundle
            | InstallMethod::GitHubJava => &self.path,
        };
        strategy.probe(ctx, name).await
    }
}
