use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;
use crate::domain::services::method_selection::is_url;

impl Installer {
    /// Installs a `.deb` with `dpkg -i`; dependencies are not fixed up.
    pub(super) async fn install_deb(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        if !is_url(&package.source) {
            let install = Invocation::new("dpkg").args(["-i", package.source.as_str()]).privileged();
            self.run_logged(ctx, install, attempt).await?;
            return Ok(());
        }

        let scratch = self.pipeline.scratch_dir().await?;
        let archive = scratch.path().join(format!("{}.deb", package.name));
        let download_ctx = ctx.with_timeout(self.config.large_download_timeout());
        self.pipeline
            .download(&download_ctx, &package.source, &archive)
            .await?;
        attempt.log(format!("downloaded {}", package.source));

        let install = Invocation::new("dpkg")
            .arg("-i")
            .arg(archive.display().to_string())
            .privileged();
        self.run_logged(ctx, install, attempt).await?;
        Ok(())
    }
}
