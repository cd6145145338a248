use super::{Installer, native, snap};
use crate::domain::context::Context;
use crate::domain::entities::{InstallMethod, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;

impl Installer {
    pub(super) async fn remove_package(
        &self,
        ctx: &Context,
        package: &Package,
        method: InstallMethod,
    ) -> InstallResult<()> {
        let invocation = match method {
            method if method.is_system_manager() => {
                native::remove_invocation(method, &package.source)?.envs(&self.proxy_env)
            }
            InstallMethod::Deb => Invocation::new("dpkg")
                .args(["-r", package.name.as_str()])
                .privileged(),
            InstallMethod::Snap => Invocation::new("snap")
                .args(["remove", snap::snap_name(&package.source, &package.name)])
                .privileged(),
            InstallMethod::Flatpak => Invocation::new("flatpak")
                .args(["uninstall", "--user", "-y", package.source.as_str()]),
            _ => return self.remove_local(package, method).await,
        };

        tracing::debug!("$ {}", invocation);
        self.runner.run(ctx, invocation).await?;
        Ok(())
    }

    /// Deletes what the user-scope handlers placed under the local prefix.
    async fn remove_local(&self, package: &Package, method: InstallMethod) -> InstallResult<()> {
        let binary = self.paths.bin_path(&package.name);
        if self.files.file_exists(&binary).await {
            self.files.remove_file(&binary).await?;
            tracing::debug!("Deleted {}", binary.display());
        }

        if matches!(method, InstallMethod::GitHubBundle | InstallMethod::GitHubJava) {
            let share = self.paths.share_path(&package.name);
            if self.files.file_exists(&share).await {
                self.files.remove_dir_all(&share).await?;
                tracing::debug!("Deleted {}", share.display());
            }
        }
        Ok(())
    }
}
