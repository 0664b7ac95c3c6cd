//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use inspect::{execute_inspect, validate_args};
pub use models::InspectArgs;
pub use utils::{display_schema, display_version, validate_summary_file};
