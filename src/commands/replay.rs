//! Replay command implementation.
//!
//! The replay command:
//! 1. Reads and validates a recorded event trace
//! 2. Replays it through a profiling session
//! 3. Writes the folded report
//! 4. Optionally prints hot paths and cycle distribution

use crate::aggregator::{calculate_cycle_distribution, calculate_hot_paths, FlatStack};
use crate::commands::models::ReplayArgs;
use crate::host::TraceReplay;
use crate::parser::read_trace;
use crate::profiler::ManualClock;
use crate::session::ProfileSession;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The exit code recorded in the trace, which the CLI surfaces as its own
///
/// # Errors
/// * Trace read or validation failures
///
/// A report that cannot be written is logged and skipped, not an error.
pub fn execute_replay(args: &ReplayArgs) -> Result<i32> {
    let start_time = Instant::now();

    info!("Replaying trace: {}", args.trace.display());
    let trace = read_trace(&args.trace)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;

    let stats = trace.stats();
    debug!(
        "Trace: {} calls, {} returns, max depth {}",
        stats.calls, stats.returns, stats.max_depth
    );

    let clock = ManualClock::new();
    let session = ProfileSession::with_parts(args.profiler_config(), clock.clone(), trace.symbols);
    let mut runtime = TraceReplay::new(trace.events, trace.exit_code, clock);

    let outcome = session.run(&mut runtime);

    if outcome.report_written {
        info!("✓ Folded stacks written to: {}", args.output.display());
    }

    if args.print_summary {
        println!("{}", render_summary(&outcome.stacks, args.top_paths));
    }

    info!(
        "Replay of {} events completed in {:.2}s",
        outcome.result.events,
        start_time.elapsed().as_secs_f64()
    );
    Ok(outcome.result.exit_code)
}

/// Validate replay arguments
///
/// **Public** - can be called before execute_replay for early validation
pub fn validate_args(args: &ReplayArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    Ok(())
}

/// Render hot paths and distribution as a text table
///
/// **Public** - used for `--summary`
pub fn render_summary(stacks: &[FlatStack], top_n: usize) -> String {
    let distribution = calculate_cycle_distribution(stacks);
    let hot_paths = calculate_hot_paths(stacks, top_n);

    let mut lines = Vec::new();
    lines.push("=".repeat(80));
    lines.push("PROFILE SUMMARY".to_string());
    lines.push("=".repeat(80));
    lines.push(distribution.summary());
    lines.push(String::new());
    lines.push(format!("{:<58} {:>12} {:>7}", "Stack (hottest first)", "CYCLES", "%"));
    lines.push("-".repeat(80));

    for path in &hot_paths {
        let display = if path.path.len() > 58 {
            let mut cut = path.path.len() - 55;
            while !path.path.is_char_boundary(cut) {
                cut += 1;
            }
            format!("...{}", &path.path[cut..])
        } else {
            path.path.clone()
        };
        lines.push(format!(
            "{:<58} {:>12} {:>6.1}%",
            display, path.cycles, path.percentage
        ));
    }

    if stacks.len() > hot_paths.len() {
        lines.push(String::new());
        lines.push(format!(
            "(Showing top {} of {} unique paths)",
            hot_paths.len(),
            stacks.len()
        ));
    }
    lines.push("=".repeat(80));

    lines.join("\n")
}
