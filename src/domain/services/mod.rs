pub mod method_selection;
pub mod validation;

pub use method_selection::{best_method, extract_repo_name};
pub use validation::PackageValidator;
