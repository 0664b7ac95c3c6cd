//! Output writers for profile summaries.
//!
//! This module handles turning an analyzed profile into:
//! - A serializable summary (hot functions, categories, phases)
//! - JSON files (pretty printed)
//! - Text reports

pub mod json;
pub mod summary;

// Re-export main functions
pub use json::{read_summary, summary_to_string, write_summary};
pub use summary::{format_text_summary, to_summary, ProfileSummary};
