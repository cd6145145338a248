pub mod command_runner;
pub mod file_manager;
pub mod network_client;
pub mod package_installer;
pub mod system_detector;

pub use command_runner::{CommandOutput, CommandRunner, Invocation};
pub use file_manager::FileManager;
pub use network_client::NetworkClient;
pub use package_installer::PackageInstaller;
pub use system_detector::SystemDetector;
