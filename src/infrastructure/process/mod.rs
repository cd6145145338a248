pub mod command;
pub mod file_manager;

pub use command::ProcessCommandRunner;
pub use file_manager::LocalFileManager;
