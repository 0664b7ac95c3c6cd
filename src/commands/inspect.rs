//! Inspect command implementation.
//!
//! The inspect command:
//! 1. Reads the profile or trace file
//! 2. Builds the profile model
//! 3. Ranks hot functions and categories
//! 4. Writes the summary

use super::models::InspectArgs;
use crate::aggregator::calculate_sample_distribution;
use crate::output::{
    format_text_summary, summary_to_string, to_summary, write_summary, ProfileSummary,
};
use crate::parser::read_input;
use crate::profile::{Profile, ProfileOptions};
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or malformed input
/// * Profiles with broken node lists or no sample data
/// * File write errors
pub fn execute_inspect(args: InspectArgs) -> Result<ProfileSummary> {
    let start_time = Instant::now();

    info!("Inspecting profile: {}", args.input.display());

    // Step 1: Parse input
    info!("Step 1/4: Reading input...");
    let input = read_input(&args.input)
        .with_context(|| format!("Failed to read profile from {}", args.input.display()))?;

    debug!(
        "Parsed input: {} nodes, {} markers",
        input.profile.nodes.len(),
        input.markers.len()
    );

    // Step 2: Build the model
    info!("Step 2/4: Building profile...");
    let options = ProfileOptions::new().with_natives(args.include_natives);
    let profile = Profile::from_input(&input, &options).context("Failed to build profile")?;

    let distribution = calculate_sample_distribution(&profile);
    info!("Sample distribution: {}", distribution.summary());

    // Step 3: Aggregate
    info!("Step 3/4: Ranking top {} functions...", args.top_functions);
    let source = args.input.display().to_string();
    let summary = to_summary(&profile, &source, args.top_functions, &args.phases);

    debug!("Top 3 hot functions:");
    for (i, function) in summary.hot_functions.iter().take(3).enumerate() {
        debug!(
            "  {}. {} samples ({:.1}%): {}",
            i + 1,
            function.self_count,
            function.self_percentage,
            function.name
        );
    }

    // Step 4: Write outputs
    info!("Step 4/4: Writing summary...");
    match &args.output_json {
        Some(path) => {
            write_summary(&summary, path).context("Failed to write summary JSON")?;
            info!("✓ Summary written to: {}", path.display());
        }
        None if !args.print_summary => {
            println!("{}", summary_to_string(&summary).context("Failed to serialize summary")?);
        }
        None => {}
    }

    if args.print_summary {
        println!("\n{}", format_text_summary(&summary, args.top_functions));
    }

    info!("Inspect completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(summary)
}

/// Validate inspect arguments
///
/// **Public** - can be called before execute_inspect for early validation
pub fn validate_args(args: &InspectArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.top_functions == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top_functions > 1000 {
        anyhow::bail!("top is too large (max 1000)");
    }

    if let Some(phase) = args.phases.iter().find(|p| p.trim().is_empty()) {
        anyhow::bail!("Phase name cannot be blank: {:?}", phase);
    }

    Ok(())
}
