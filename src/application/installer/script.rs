use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;
use crate::domain::services::method_selection::is_url;

impl Installer {
    pub(super) async fn install_script(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        if !is_url(&package.source) {
            self.run_logged(ctx, Invocation::new(&package.source), attempt).await?;
            return Ok(());
        }

        let script = self
            .paths
            .temp_dir
            .join(format!("devstrap-{}-install.sh", package.name));
        tracing::warn!(
            "Running the install script for {} from {} without verification",
            package.name,
            package.source
        );
        attempt.log(format!("warning: {} is executed unverified", package.source));

        self.files.ensure_dir(&self.paths.temp_dir).await?;
        self.pipeline.download(ctx, &package.source, &script).await?;
        self.files.set_executable(&script).await?;

        let run = Invocation::new("bash").arg(script.display().to_string());
        let outcome = self.run_logged(ctx, run, attempt).await;
        if let Err(e) = self.files.remove_file(&script).await {
            tracing::debug!("Could not remove {}: {}", script.display(), e);
        }
        outcome.map(|_| ())
    }
}
