use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, InstallMethod, Package};
use crate::domain::errors::InstallResult;
use crate::domain::ports::Invocation;

const EMPTY_CONFIG: &[u8] = b"[tools]\n";

/// `tool` or `tool@version`.
pub(super) fn tool_reference(package: &Package) -> String {
    match package.pinned_version() {
        Some(version) => format!("{}@{}", package.source, version),
        None => package.source.clone(),
    }
}

impl Installer {
    pub(super) async fn install_mise(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        self.require_tool("mise", InstallMethod::Mise)?;

        let config = self.paths.mise_config();
        if !self.files.file_exists(&config).await {
            self.files.write_file(&config, EMPTY_CONFIG).await?;
            attempt.log(format!("created {}", config.display()));
        }

        let invocation = Invocation::new("mise").args(["use", "-g"]).arg(tool_reference(package));
        self.run_logged(ctx, invocation, attempt).await?;
        Ok(())
    }
}
