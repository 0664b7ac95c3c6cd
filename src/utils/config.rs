//! Configuration and constants for the engine and CLI.

/// Current summary schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default number of hot functions reported by `inspect`
pub const DEFAULT_TOP_FUNCTIONS: usize = 20;

/// File view key used for nodes without a source URL
pub const PROGRAM_FILE_NAME: &str = "program";

// Reserved V8 function names for frames without a script
pub const GC_FUNCTION_NAME: &str = "(garbage collector)";
pub const PROGRAM_FUNCTION_NAME: &str = "(program)";
pub const IDLE_FUNCTION_NAME: &str = "(idle)";

// URL classification rules, checked in this order
pub const NATIVE_URL_PATTERN: &str = r"^(?:native\s|v8/|extensions::)";
pub const PROFILER_URL_PATTERN: &str = r"(?:^|[/\\])profile[-_]lens[/\\]";
pub const RUNTIME_URL_PATTERN: &str =
    r"^(?:node:|internal[/\\]|(?:events|fs|module|net|path|stream|timers|util|vm)\.js$)";
pub const COMPILER_URL_PATTERN: &str =
    r"(?:^|[/\\])(?:src[/\\]compiler|typescript[/\\]lib|built[/\\]local)[/\\](?P<rest>.*)$";

/// Phase marker naming: the span of phase `X` runs from `before-X` to `after-X`
pub const BEFORE_MARKER_PREFIX: &str = "before-";
pub const AFTER_MARKER_PREFIX: &str = "after-";

// Trace-event names and phases understood by the input parser
pub const CPU_PROFILE_EVENT: &str = "CpuProfile";
pub const PROFILE_EVENT: &str = "Profile";
pub const PROFILE_CHUNK_EVENT: &str = "ProfileChunk";
pub const MARKER_PHASES: &[&str] = &["R", "I", "i", "n"];
