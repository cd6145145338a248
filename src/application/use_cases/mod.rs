pub mod application_operations;
pub mod package_operations;

pub use application_operations::*;
pub use package_operations::*;
