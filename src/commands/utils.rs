use crate::parser::read_trace;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate an event trace file
pub fn validate_trace_file(file_path: &Path) -> Result<()> {
    println!("Validating trace: {}", file_path.display());

    let trace = read_trace(file_path)
        .with_context(|| format!("Invalid trace {}", file_path.display()))?;
    let stats = trace.stats();

    println!("✓ Valid event trace");
    println!("  Version: {}", trace.version);
    println!("  Exit Code: {}", trace.exit_code);
    println!("  Calls: {}", stats.calls);
    println!("  Returns: {}", stats.returns);
    println!("  Max Depth: {}", stats.max_depth);
    println!("  Duration: {} cycles", stats.duration);
    println!("  Symbols: {}", trace.symbols.len());

    if stats.calls != stats.returns {
        println!(
            "  ⚠ {} unbalanced events (open frames are closed at end of replay)",
            stats.calls.abs_diff(stats.returns)
        );
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Flamehook v{}", env!("CARGO_PKG_VERSION"));
    println!("Event Trace Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A call-tree profiler for embedded script runtimes.");
}
