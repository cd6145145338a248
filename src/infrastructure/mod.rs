pub mod catalog_repository;
pub mod config_repository;
pub mod network;
pub mod process;
pub mod system_detector;

pub use catalog_repository::CatalogRepository;
pub use config_repository::ConfigRepository;
pub use network::HttpNetworkClient;
pub use process::{LocalFileManager, ProcessCommandRunner};
pub use system_detector::OsSystemDetector;
