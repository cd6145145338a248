//! The installation dispatcher.
//!
//! [`Installer`] validates a package, honors dry-run, skips packages that are
//! already present and then hands the package to exactly one handler, chosen
//! by its (normalized) method. Each handler family lives in its own module.

mod apt;
mod aqua;
mod binary;
mod deb;
mod flatpak;
mod github;
mod listing;
mod mise;
mod native;
mod removal;
mod script;
mod snap;

pub use apt::proxy_env;
pub use aqua::{AquaConfig, AquaPackage, AquaRegistry};
pub use github::{GitHubAsset, GitHubRelease, repository_ref, select_asset};
pub use snap::snap_install_args;

use crate::application::detection::{DetectionCascade, MethodChecks};
use crate::application::pipeline::ArtifactPipeline;
use crate::domain::context::Context;
use crate::domain::entities::{
    InstallAttempt, InstallMethod, InstallOutcome, InstallPaths, InstallationResult, InstallerConfig,
    Package,
};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::ports::{
    CommandOutput, CommandRunner, FileManager, Invocation, NetworkClient, PackageInstaller,
};
use crate::domain::services::PackageValidator;
use crate::domain::services::method_selection::is_url;
use async_trait::async_trait;
use std::sync::Arc;

pub struct Installer {
    runner: Arc<dyn CommandRunner>,
    files: Arc<dyn FileManager>,
    network: Arc<dyn NetworkClient>,
    pipeline: ArtifactPipeline,
    cascade: DetectionCascade,
    checks: MethodChecks,
    paths: InstallPaths,
    config: InstallerConfig,
    proxy_env: Vec<(String, String)>,
    architecture: String,
    dry_run: bool,
}

impl Installer {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileManager>,
        network: Arc<dyn NetworkClient>,
        paths: InstallPaths,
        config: InstallerConfig,
    ) -> Self {
        let pipeline = ArtifactPipeline::new(
            Arc::clone(&runner),
            Arc::clone(&files),
            Arc::clone(&network),
            paths.temp_dir.clone(),
        );
        let cascade = DetectionCascade::standard(Arc::clone(&runner), Arc::clone(&files), &paths);
        let checks = MethodChecks::new(Arc::clone(&runner), Arc::clone(&files), &paths);

        Self {
            runner,
            files,
            network,
            pipeline,
            cascade,
            checks,
            paths,
            dry_run: config.dry_run,
            config,
            proxy_env: proxy_env(|key| std::env::var(key).ok()),
            architecture: std::env::consts::ARCH.to_string(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_proxy_env(mut self, proxy_env: Vec<(String, String)>) -> Self {
        self.proxy_env = proxy_env;
        self
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    /// What the method's own tooling knows the package as. System and
    /// flatpak installs go by the source; user-scope binaries by the name.
    fn installed_identifier<'a>(package: &'a Package, method: InstallMethod) -> &'a str {
        match method {
            InstallMethod::Apt | InstallMethod::Flatpak => &package.source,
            InstallMethod::Snap => snap::snap_name(&package.source, &package.name),
            _ => &package.name,
        }
    }

    fn require_tool(&self, tool: &str, method: InstallMethod) -> InstallResult<()> {
        if self.runner.command_exists(tool) {
            Ok(())
        } else {
            Err(InstallError::ToolMissing {
                tool: tool.to_string(),
                method,
            })
        }
    }

    async fn run_logged(
        &self,
        ctx: &Context,
        invocation: Invocation,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<CommandOutput> {
        attempt.log(format!("$ {}", invocation));
        let output = self.runner.run(ctx, invocation).await?;
        attempt.log(&output.stdout);
        Ok(output)
    }

    /// What a real run would do, for dry-run output.
    fn plan(&self, package: &Package, method: InstallMethod) -> String {
        let source = &package.source;
        match method {
            InstallMethod::Apt => format!(
                "sudo apt-get update && sudo apt-get install -y {}",
                source
            ),
            InstallMethod::Snap => format!("sudo snap {}", snap_install_args(source, &package.name).join(" ")),
            InstallMethod::Flatpak => format!("flatpak install --user -y flathub {}", source),
            InstallMethod::Deb if is_url(source) => format!("download {} and sudo dpkg -i it", source),
            InstallMethod::Deb => format!("sudo dpkg -i {}", source),
            InstallMethod::Script => format!("run install script {}", source),
            InstallMethod::Mise => format!("mise use -g {}", mise::tool_reference(package)),
            InstallMethod::Aqua => format!(
                "add {} to {} and run aqua install --all",
                aqua::entry_name(package),
                self.paths.aqua_config().display()
            ),
            InstallMethod::GitHubBundle | InstallMethod::GitHubJava => format!(
                "unpack {} into {} and link its executables",
                source,
                self.paths.share_path(&package.name).display()
            ),
            InstallMethod::Dnf | InstallMethod::Yum | InstallMethod::Pacman | InstallMethod::Zypper => {
                match native::install_invocation(method, source) {
                    Ok(invocation) => invocation.command_line(),
                    Err(e) => e.to_string(),
                }
            }
            InstallMethod::Binary | InstallMethod::GitHub | InstallMethod::GitHubBinary => format!(
                "install {} as {}",
                source,
                self.paths.bin_path(&package.name).display()
            ),
        }
    }

    async fn dispatch(
        &self,
        ctx: &Context,
        package: &Package,
        method: InstallMethod,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        match method {
            InstallMethod::Apt => self.install_apt(ctx, package, attempt).await,
            InstallMethod::Snap => self.install_snap(ctx, package, attempt).await,
            InstallMethod::Flatpak => self.install_flatpak(ctx, package, attempt).await,
            InstallMethod::Deb => self.install_deb(ctx, package, attempt).await,
            InstallMethod::Script => self.install_script(ctx, package, attempt).await,
            InstallMethod::Mise => self.install_mise(ctx, package, attempt).await,
            InstallMethod::Aqua => self.install_aqua(ctx, package, attempt).await,
            InstallMethod::Binary => self.install_binary(ctx, package, attempt).await,
            InstallMethod::GitHub | InstallMethod::GitHubBinary => {
                self.install_github_binary(ctx, package, attempt).await
            }
            InstallMethod::GitHubBundle => self.install_github_bundle(ctx, package, attempt).await,
            InstallMethod::GitHubJava => self.install_github_java(ctx, package, attempt).await,
            InstallMethod::Dnf | InstallMethod::Yum | InstallMethod::Pacman | InstallMethod::Zypper => {
                self.install_native(ctx, package, method, attempt).await
            }
        }
    }
}

#[async_trait]
impl PackageInstaller for Installer {
    async fn install(&self, ctx: &Context, package: &Package) -> InstallationResult {
        let mut attempt = InstallationResult::begin(package.clone());
        if let Err(e) = PackageValidator::validate_package(package) {
            tracing::error!("Refusing to install {}: {}", package.name, e);
            return attempt.fail(e);
        }

        let method = package.method.normalized();
        if self.dry_run {
            let plan = self.plan(package, method);
            tracing::info!("[dry-run] {}: would {}", package.name, plan);
            attempt.log(format!("[dry-run] would {}", plan));
            return attempt.succeed(InstallOutcome::DryRun);
        }

        if method.has_precheck() {
            let identifier = Self::installed_identifier(package, method);
            match self.checks.check(ctx, identifier, method).await {
                Ok(true) => {
                    tracing::info!("{} is already installed via {}", package.name, method);
                    attempt.log(format!("{} is already installed", package.name));
                    return attempt.succeed(InstallOutcome::AlreadyPresent);
                }
                Ok(false) => {}
                Err(e) => tracing::debug!("Pre-install check for {} failed: {}", package.name, e),
            }
        }

        tracing::info!("Installing {} via {}", package.name, method);
        match self.dispatch(ctx, package, method, &mut attempt).await {
            Ok(()) => {
                tracing::info!("Installed {}", package.name);
                attempt.succeed(InstallOutcome::Installed)
            }
            Err(e) => {
                tracing::error!("Failed to install {}: {}", package.name, e);
                attempt.fail(e)
            }
        }
    }

    async fn remove(&self, ctx: &Context, package: &Package) -> InstallResult<()> {
        PackageValidator::validate_package(package)?;
        let method = package.method.normalized();
        if self.dry_run {
            tracing::info!("[dry-run] would remove {} ({})", package.name, method);
            return Ok(());
        }
        self.remove_package(ctx, package, method).await?;
        tracing::info!("Removed {}", package.name);
        Ok(())
    }

    async fn list(&self, ctx: &Context) -> InstallResult<Vec<Package>> {
        self.list_packages(ctx).await
    }

    async fn is_installed(&self, ctx: &Context, name: &str) -> InstallResult<bool> {
        Ok(self.cascade.is_installed(ctx, name).await)
    }

    async fn detect_method(&self, ctx: &Context, name: &str) -> Option<InstallMethod> {
        self.cascade.detect(ctx, name).await
    }

    async fn is_installed_by_method(
        &self,
        ctx: &Context,
        name: &str,
        method: InstallMethod,
    ) -> InstallResult<bool> {
        self.checks.check(ctx, name, method).await
    }
}
