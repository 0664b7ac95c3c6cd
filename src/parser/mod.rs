//! Profile input parsing and raw record definitions.
//!
//! This module handles:
//! - Raw `.cpuprofile` records (nodes, samples, time deltas)
//! - Chrome trace-event documents carrying a CPU profile
//! - Extracting the marker stream recorded alongside the profile

pub mod cpuprofile;
pub mod schema;

// Re-export main types
pub use cpuprofile::{parse_input, read_input};
pub use schema::{CallFrame, PositionTickInfo, ProfileInput, RawMarker, RawNode, RawProfile};
