pub mod detection;
pub mod dto;
pub mod installer;
pub mod pipeline;
pub mod use_case_container;
pub mod use_cases;

pub use installer::Installer;
pub use use_case_container::UseCaseContainer;
