use crate::output::read_summary;
use crate::profile::Category;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a summary JSON file
pub fn validate_summary_file(file_path: &Path) -> Result<()> {
    println!("Validating summary: {}", file_path.display());

    let summary = read_summary(file_path)
        .with_context(|| format!("Invalid summary file {}", file_path.display()))?;

    println!("✓ Valid summary JSON");
    println!("  Version: {}", summary.version);
    println!("  Source: {}", summary.source);
    println!("  Samples: {}", summary.total_samples);
    println!("  Hot Functions: {}", summary.hot_functions.len());
    println!("  Categories: {}", summary.categories.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Profile Lens Summary Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  source: string               - Input file");
        println!("  start_time, end_time: number - Profile bounds (microseconds)");
        println!("  total_samples: number        - Samples in the profile");
        println!("  node_count: number           - Call tree nodes after native folding");
        println!("  average_sample_duration: number");
        println!("  include_natives: bool        - Whether native frames were kept");
        println!("  hot_functions: array         - Functions by self samples");
        println!("    name, url, line?, category, self_count, total_count,");
        println!("    self_percentage, total_percentage");
        println!("  categories: array            - Per-category samples");
        println!("  phases: array?               - Per-phase time and samples");
        println!("  generated_at: string         - RFC 3339 timestamp");
        println!();
        println!("Categories:");
        for category in Category::ALL {
            let depth = category.ancestors().count();
            println!("  {}{}", "  ".repeat(depth), category);
        }
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Profile Lens v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call tree, category and phase analysis for V8 CPU profiles.");
}
