use crate::utils::config::{ProfilerConfig, DEFAULT_OUTPUT_PATH};
use std::path::PathBuf;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Recorded event trace (JSON)
    pub trace: PathBuf,

    /// Output path for the folded report
    pub output: PathBuf,

    /// Number of hot paths shown in the summary
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Subtract measured instrumentation overhead
    pub compensate_overhead: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            top_paths: 20,
            print_summary: false,
            compensate_overhead: true,
        }
    }
}

impl ReplayArgs {
    /// Profiler configuration for this replay
    pub fn profiler_config(&self) -> ProfilerConfig {
        ProfilerConfig::new()
            .with_output_path(&self.output)
            .with_overhead_compensation(self.compensate_overhead)
    }
}
