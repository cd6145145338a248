use super::Installer;
use crate::domain::context::Context;
use crate::domain::entities::{InstallAttempt, Package};
use crate::domain::errors::{InstallError, InstallResult};
use crate::domain::services::method_selection::is_url;
use std::path::Path;

impl Installer {
    pub(super) async fn install_binary(
        &self,
        ctx: &Context,
        package: &Package,
        attempt: &mut InstallAttempt,
    ) -> InstallResult<()> {
        let local_bin = &self.paths.local_bin;
        let target = if is_url(&package.source) {
            self.pipeline
                .download_executable(ctx, &package.source, local_bin, &package.name)
                .await?
        } else if self.files.file_exists(Path::new(&package.source)).await {
            self.pipeline
                .install_executable(Path::new(&package.source), local_bin, &package.name)
                .await?
        } else {
            return Err(InstallError::InvalidPackage(format!(
                "binary source {} is neither a URL nor an existing file",
                package.source
            )));
        };

        attempt.log(format!("installed {}", target.display()));
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::application::installer::tests::harness;
    use crate::domain::context::Context;
    use crate::domain::entities::{InstallMethod, InstallOutcome, Package};
    use crate::domain::errors::InstallError;
    use crate::domain::ports::PackageInstaller;
    use crate::test_support::{MockCommandRunner, MockNetworkClient};
    use std::os::unix::fs::PermissionsExt;

    const URL: &str = "https://example.com/releases/kubectl";

    #[tokio::test]
    async fn downloads_into_local_bin_as_executable() {
        let h = harness(
            MockCommandRunner::new(),
            MockNetworkClient::new().serve(URL, "\x7fELF"),
        );
        let package = Package::new("kubectl", URL, InstallMethod::Binary);
        let ctx = Context::background();

        let result = h.installer.install(&ctx, &package).await;
        assert!(result.success, "{:?}", result.error);
        let target = h.installer.paths().bin_path("kubectl");
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        let again = h.installer.install(&ctx, &package).await;
        assert_eq!(again.outcome, InstallOutcome::AlreadyPresent);
        assert_eq!(h.network.requests().len(), 1);
    }

    #[tokio::test]
    async fn unknown_source_is_invalid() {
        let h = harness(MockCommandRunner::new(), MockNetworkClient::new());
        let package = Package::new("tool", "not-a-url-or-file", InstallMethod::Binary);
        let result = h.installer.install(&Context::background(), &package).await;
        assert!(matches!(result.error, Some(InstallError::InvalidPackage(_))));
    }
}
