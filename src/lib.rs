//! Profile Lens
//!
//! Time-aware analysis of V8 CPU profiles: a call tree with native frames
//! folded into their callers, per-sample timestamps, and aggregated
//! function, file and category views that can be sliced by marker-delimited
//! phases.
//!
//! This crate provides the core implementation for the `profile-lens` CLI.
//!
//! ## Getting Started
//!
//! ```ignore
//! use profile_lens::parser::read_input;
//! use profile_lens::profile::{Profile, ProfileOptions};
//!
//! let input = read_input("trace.json")?;
//! let profile = Profile::from_input(&input, &ProfileOptions::new())?;
//! let checker = profile.category_view_by_name("checker")?;
//! let ranges = profile.get_ranges("before-check", "after-check");
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod profile;
pub mod timeline;
pub mod utils;
