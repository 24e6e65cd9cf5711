//! CLI command implementations

pub mod create;
pub mod format;
pub mod generate;

pub use create::{validate_project_name, CreateCommand};
pub use format::FormatCommand;
pub use generate::GenerateCommand;
