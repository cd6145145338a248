use crate::domain::{
    context::Context,
    entities::{InstallMethod, InstallationResult, Package},
    errors::InstallResult,
    ports::PackageInstaller,
};
use std::sync::Arc;

pub struct InstallPackage {
    installer: Arc<dyn PackageInstaller>,
}

impl InstallPackage {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    pub async fn execute(&self, ctx: &Context, package: Package) -> InstallationResult {
        self.installer.install(ctx, &package).await
    }
}

pub struct RemovePackage {
    installer: Arc<dyn PackageInstaller>,
}

impl RemovePackage {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    pub async fn execute(&self, ctx: &Context, package: Package) -> InstallResult<()> {
        self.installer.remove(ctx, &package).await
    }
}

pub struct ListPackages {
    installer: Arc<dyn PackageInstaller>,
}

impl ListPackages {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    pub async fn execute(&self, ctx: &Context) -> InstallResult<Vec<Package>> {
        self.installer.list(ctx).await
    }
}

pub struct CheckInstalled {
    installer: Arc<dyn PackageInstaller>,
}

impl CheckInstalled {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    /// The method `name` was found through, or `None` when it is absent.
    pub async fn execute(&self, ctx: &Context, name: &str) -> Option<InstallMethod> {
        self.installer.detect_method(ctx, name).await
    }

    pub async fn by_method(
        &self,
        ctx: &Context,
        name: &str,
        method: InstallMethod,
    ) -> InstallResult<bool> {
        self.installer.is_installed_by_method(ctx, name, method).await
    }
}
