//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while reading raw profiler input
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid profile format: {0}")]
    InvalidFormat(String),

    #[error("No CPU profile record found in input")]
    ProfileNotFound,

    #[error("Failed to read input: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors that can occur while building or querying a profile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Profile has neither hit counts nor a sample stream")]
    MissingSampleData,

    #[error("Node {parent} lists unknown child {child}")]
    DanglingChild { parent: u64, child: u64 },

    #[error("Duplicate node id: {0}")]
    DuplicateNode(u64),

    #[error("Sample references unknown node {0}")]
    UnknownSampleNode(u64),

    #[error("Node not found: {0}")]
    NodeNotFound(u64),

    #[error("Function not found: {0}")]
    FunctionViewNotFound(String),

    #[error("File not found: {0}")]
    FileViewNotFound(String),

    #[error("Category not present in profile: {0}")]
    CategoryViewNotFound(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
