use crate::domain::entities::{Distribution, PackageManagerInfo, SystemInfo};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SystemDetector: Send + Sync {
    async fn detect_system(&self) -> Result<SystemInfo>;
    async fn detect_distribution(&self) -> Result<Distribution>;
    async fn detect_desktop_environment(&self) -> Option<String>;
    async fn detect_package_manager(&self) -> Result<PackageManagerInfo>;
}
