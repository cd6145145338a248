use crate::application::use_cases::*;
use crate::domain::ports::{PackageInstaller, SystemDetector};
use std::sync::Arc;

pub struct UseCaseContainer {
    pub install: Arc<InstallPackage>,
    pub remove: Arc<RemovePackage>,
    pub list: Arc<ListPackages>,
    pub check: Arc<CheckInstalled>,
    pub install_application: Arc<InstallApplication>,
    pub install_applications: Arc<InstallMultipleApplications>,
    pub apply_catalog: Arc<ApplyCatalog>,
    pub detect_system: Arc<DetectSystem>,
}

impl UseCaseContainer {
    pub fn new(installer: Arc<dyn PackageInstaller>, detector: Arc<dyn SystemDetector>) -> Self {
        Self {
            install: Arc::new(InstallPackage::new(Arc::clone(&installer))),
            remove: Arc::new(RemovePackage::new(Arc::clone(&installer))),
            list: Arc::new(ListPackages::new(Arc::clone(&installer))),
            check: Arc::new(CheckInstalled::new(Arc::clone(&installer))),
            install_application: Arc::new(InstallApplication::new(
                Arc::clone(&detector),
                Arc::clone(&installer),
            )),
            install_applications: Arc::new(InstallMultipleApplications::new(
                Arc::clone(&detector),
                Arc::clone(&installer),
            )),
            apply_catalog: Arc::new(ApplyCatalog::new(Arc::clone(&installer))),
            detect_system: Arc::new(DetectSystem::new(detector)),
        }
    }
}
