use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, InstallMethod, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;

pub(super) const FLATHUB_REPO: &str = "https://dl.flathub.org/repo/flathub.flatpakrepo";

impl Installer {
    pub(super) async fn install_flatpak(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        self.require_tool("flatpak", InstallMethod::Flatpak)?;

        let remote = Invocation::new("flatpak").args([
            "remote-add",
            "--user",
            "--if-not-exists",
            "flathub",
            FLATHUB_REPO,
        ]);
        self.run_logged(ctx, remote, attempt).await?;

        let install = Invocation::new("flatpak")
            .args(["install", "--user", "-y", "flathub"])
            .arg(&package.source);
        self.run_logged(ctx, install, attempt).await?;
        Ok(())
    }
}
