//! Configuration and constants for the profiler and CLI.

use std::path::PathBuf;

/// Current event trace schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default destination for the folded report
pub const DEFAULT_OUTPUT_PATH: &str = "stacks.fg";

/// First segment of every folded path
pub const ROOT_MARKER: &str = "root";

/// Segment prefix for interpreted (script) frames
pub const SCRIPT_TAG: &str = "LUA:";

/// Segment prefix for native frames
pub const NATIVE_TAG: &str = "C:";

/// Display name of the program entry chunk
pub const PROGRAM_ENTRY_NAME: &str = "main";

/// Profiling session configuration
#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Where the folded report is written
    pub output_path: PathBuf,

    /// Subtract measured instrumentation overhead before attributing self time
    pub compensate_overhead: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            compensate_overhead: true,
        }
    }
}

impl ProfilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_overhead_compensation(mut self, enabled: bool) -> Self {
        self.compensate_overhead = enabled;
        self
    }
}
