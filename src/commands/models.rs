use crate::utils::config::DEFAULT_TOP_FUNCTIONS;
use std::path::PathBuf;

/// Arguments for the inspect command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Profile or trace file to analyze
    pub input: PathBuf,

    /// Output path for the JSON summary (None = stdout)
    pub output_json: Option<PathBuf>,

    /// Number of hot functions to include in the summary
    pub top_functions: usize,

    /// Phase names to break down by `before-`/`after-` markers
    pub phases: Vec<String>,

    /// Keep native frames instead of folding them into callers
    pub include_natives: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("profile.cpuprofile"),
            output_json: None,
            top_functions: DEFAULT_TOP_FUNCTIONS,
            phases: Vec::new(),
            include_natives: false,
            print_summary: false,
        }
    }
}
