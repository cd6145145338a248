use crate::domain::context::Context;
use crate::domain::entities::{InstallMethod, InstallationResult, Package};
use crate::domain::errors::InstallResult;
use crate::domain::services::method_selection;
use async_trait::async_trait;

#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(&self, ctx: &Context, package: &Package) -> InstallationResult;
    async fn remove(&self, ctx: &Context, package: &Package) -> InstallResult<()>;
    async fn list(&self, ctx: &Context) -> InstallResult<Vec<Package>>;
    async fn is_installed(&self, ctx: &Context, name: &str) -> InstallResult<bool>;
    /// The method through which `name` was found, if any.
    async fn detect_method(&self, ctx: &Context, name: &str) -> Option<InstallMethod>;
    async fn is_installed_by_method(
        &self,
        ctx: &Context,
        name: &str,
        method: InstallMethod,
    ) -> InstallResult<bool>;

    fn best_method(&self, source: &str) -> InstallMethod {
        method_selection::best_method(source)
    }
}
