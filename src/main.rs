//! Profile Lens CLI
//!
//! Call tree, category and phase analysis for V8 CPU profiles.
//! Reads `.cpuprofile` files or Chrome trace-event documents.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use profile_lens::commands::{
    display_schema, display_version, execute_inspect, validate_args, validate_summary_file,
    InspectArgs,
};
use profile_lens::utils::config::DEFAULT_TOP_FUNCTIONS;

/// Profile Lens - analysis for V8 CPU profiles
#[derive(Parser, Debug)]
#[command(name = "profile-lens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a profile and summarize hot functions, categories and phases
    Inspect {
        /// `.cpuprofile` or trace-event JSON file
        input: PathBuf,

        /// Output path for the JSON summary (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of hot functions to include
        #[arg(long, default_value_t = DEFAULT_TOP_FUNCTIONS)]
        top: usize,

        /// Phase to measure between `before-<phase>` and `after-<phase>` markers (repeatable)
        #[arg(long = "phase")]
        phases: Vec<String>,

        /// Keep native frames instead of folding them into their callers
        #[arg(long, env = "PROFILE_LENS_INCLUDE_NATIVES")]
        include_natives: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a summary JSON file
    Validate {
        /// Path to summary JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Inspect {
            input,
            output,
            top,
            phases,
            include_natives,
            summary,
        } => {
            let args = InspectArgs {
                input,
                output_json: output,
                top_functions: top,
                phases,
                include_natives,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_inspect(args)?;
        }

        Commands::Validate { file } => {
            validate_summary_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
