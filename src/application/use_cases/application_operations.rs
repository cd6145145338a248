use crate::domain::{
    context::Context,
    entities::{Catalog, InstallationResult, Package, SystemInfo},
    errors::InstallResult,
    ports::{PackageInstaller, SystemDetector},
};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct DetectSystem {
    detector: Arc<dyn SystemDetector>,
}

impl DetectSystem {
    pub fn new(detector: Arc<dyn SystemDetector>) -> Self {
        Self { detector }
    }

    pub async fn execute(&self) -> Result<SystemInfo> {
        self.detector.detect_system().await
    }
}

/// Installs a plain application name with whatever method suits this system.
pub struct InstallApplication {
    detector: Arc<dyn SystemDetector>,
    installer: Arc<dyn PackageInstaller>,
}

impl InstallApplication {
    pub fn new(detector: Arc<dyn SystemDetector>, installer: Arc<dyn PackageInstaller>) -> Self {
        Self {
            detector,
            installer,
        }
    }

    pub async fn execute(
        &self,
        ctx: &Context,
        name: &str,
        source: &str,
    ) -> InstallResult<InstallationResult> {
        let system = self.detector.detect_system().await?;
        let method = system.preferred_method();
        tracing::debug!(
            "{} {} uses {} for {}",
            system.distribution.id,
            system.distribution.version,
            method,
            name
        );
        let package = Package::new(name, source, method);
        Ok(self.installer.install(ctx, &package).await)
    }
}

/// Installs applications one after another; a failing entry never stops the
/// rest.
pub struct InstallMultipleApplications {
    single: InstallApplication,
    installer: Arc<dyn PackageInstaller>,
}

impl InstallMultipleApplications {
    pub fn new(detector: Arc<dyn SystemDetector>, installer: Arc<dyn PackageInstaller>) -> Self {
        Self {
            single: InstallApplication::new(detector, Arc::clone(&installer)),
            installer,
        }
    }

    /// Fails only when the context is already done; otherwise returns one
    /// result per entry, in map order.
    pub async fn execute(
        &self,
        ctx: &Context,
        applications: &BTreeMap<String, String>,
    ) -> InstallResult<Vec<InstallationResult>> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let mut results = Vec::with_capacity(applications.len());
        for (name, source) in applications {
            let result = match self.single.execute(ctx, name, source).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Could not install {}: {}", name, e);
                    let method = self.installer.best_method(source);
                    InstallationResult::begin(Package::new(name, source, method)).fail(e)
                }
            };
            results.push(result);
        }
        Ok(results)
    }
}

pub struct ApplyCatalog {
    installer: Arc<dyn PackageInstaller>,
}

impl ApplyCatalog {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    pub async fn execute(
        &self,
        ctx: &Context,
        catalog: &Catalog,
    ) -> InstallResult<Vec<InstallationResult>> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let mut results = Vec::with_capacity(catalog.total_count());
        for package in catalog.packages() {
            results.push(self.installer.install(ctx, &package).await);
        }
        let failed = results.iter().filter(|r| !r.success).count();
        tracing::info!(
            "Applied catalog: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CatalogEntry, InstallMethod, InstallOutcome};
    use crate::domain::errors::InstallError;
    use crate::test_support::{StaticSystemDetector, ubuntu_system};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fails every package whose name is listed.
    #[derive(Default)]
    struct ScriptedInstaller {
        failing: Vec<&'static str>,
        installed: Mutex<Vec<Package>>,
    }

    #[async_trait]
    impl PackageInstaller for ScriptedInstaller {
        async fn install(&self, _ctx: &Context, package: &Package) -> InstallationResult {
            self.installed.lock().unwrap().push(package.clone());
            let attempt = InstallationResult::begin(package.clone());
            if self.failing.contains(&package.name.as_str()) {
                attempt.fail(InstallError::InvalidPackage(package.name.clone()))
            } else {
                attempt.succeed(InstallOutcome::Installed)
            }
        }

        async fn remove(&self, _ctx: &Context, _package: &Package) -> InstallResult<()> {
            Ok(())
        }

        async fn list(&self, _ctx: &Context) -> InstallResult<Vec<Package>> {
            Ok(Vec::new())
        }

        async fn is_installed(&self, _ctx: &Context, _name: &str) -> InstallResult<bool> {
            Ok(false)
        }

        async fn detect_method(&self, _ctx: &Context, _name: &str) -> Option<InstallMethod> {
            None
        }

        async fn is_installed_by_method(
            &self,
            _ctx: &Context,
            _name: &str,
            _method: InstallMethod,
        ) -> InstallResult<bool> {
            Ok(false)
        }
    }

    fn batch() -> BTreeMap<String, String> {
        ["a", "b", "c"]
            .into_iter()
            .map(|name| (name.to_string(), name.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn batch_isolates_the_failing_entry() {
        let installer = Arc::new(ScriptedInstaller {
            failing: vec!["b"],
            ..Default::default()
        });
        let use_case = InstallMultipleApplications::new(
            Arc::new(StaticSystemDetector::new(ubuntu_system())),
            installer.clone(),
        );

        let results = use_case.execute(&Context::background(), &batch()).await.unwrap();
        let outcome: Vec<_> = results
            .iter()
            .map(|r| (r.package.name.as_str(), r.success))
            .collect();
        assert_eq!(outcome, [("a", true), ("b", false), ("c", true)]);
        assert!(
            installer
                .installed
                .lock()
                .unwrap()
                .iter()
                .all(|p| p.method == InstallMethod::Apt)
        );
    }

    #[tokio::test]
    async fn detection_failure_fails_each_entry_without_installing() {
        let installer = Arc::new(ScriptedInstaller::default());
        let use_case = InstallMultipleApplications::new(
            Arc::new(StaticSystemDetector::failing()),
            installer.clone(),
        );

        let results = use_case.execute(&Context::background(), &batch()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.success && r.error.is_some()));
        assert!(installer.installed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn canceled_batch_does_not_start() {
        let installer = Arc::new(ScriptedInstaller::default());
        let use_case = InstallMultipleApplications::new(
            Arc::new(StaticSystemDetector::new(ubuntu_system())),
            installer.clone(),
        );
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();

        let err = use_case.execute(&ctx, &batch()).await.unwrap_err();
        assert!(matches!(err, InstallError::Context(_)));
        assert!(installer.installed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn catalog_entries_keep_their_methods() {
        let installer = Arc::new(ScriptedInstaller {
            failing: vec!["gradle"],
            ..Default::default()
        });
        let mut catalog = Catalog::new();
        catalog.add(CatalogEntry::new("node", InstallMethod::Mise));
        catalog.add(CatalogEntry::new("gradle", InstallMethod::GitHubJava).with_source("gradle/gradle"));
        catalog.add(CatalogEntry::new("org.gimp.GIMP", InstallMethod::Flatpak));

        let results = ApplyCatalog::new(installer.clone())
            .execute(&Context::background(), &catalog)
            .await
            .unwrap();
        assert_eq!(results.iter().filter(|r| r.success).count(), 2);
        let methods: Vec<_> = installer.installed.lock().unwrap().iter().map(|p| p.method).collect();
        assert_eq!(
            methods,
            [InstallMethod::Mise, InstallMethod::GitHubJava, InstallMethod::Flatpak]
        );
    }
}
