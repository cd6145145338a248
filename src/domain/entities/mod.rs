pub mod catalog;
pub mod config;
pub mod installation_result;
pub mod package;
pub mod system_info;

pub use catalog::{Catalog, CatalogEntry};
pub use config::{InstallPaths, InstallerConfig};
pub use installation_result::{InstallAttempt, InstallOutcome, InstallationResult};
pub use package::{InstallMethod, LATEST_VERSION, Package};
pub use system_info::{DistroFamily, Distribution, PackageManagerInfo, SystemInfo};
