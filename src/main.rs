//! Flamehook CLI
//!
//! Replays recorded script-runtime hook events through the call-tree
//! profiler and writes folded stacks for flamegraph tools.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use flamehook::commands::{
    display_version, execute_replay, validate_args, validate_trace_file, ReplayArgs,
};
use flamehook::utils::config::DEFAULT_OUTPUT_PATH;

/// Flamehook - call-tree profiling for embedded script runtimes
#[derive(Parser, Debug)]
#[command(name = "flamehook")]
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
    /// Replay a recorded event trace and write folded stacks
    Replay {
        /// Recorded event trace (JSON)
        #[arg(short, long)]
        trace: PathBuf,

        /// Output path for the folded report
        #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, env = "FLAMEHOOK_OUTPUT")]
        output: PathBuf,

        /// Number of top hot paths in the summary
        #[arg(long, default_value = "20")]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Keep instrumentation overhead in reported cycles
        #[arg(long)]
        no_overhead_compensation: bool,
    },

    /// Validate an event trace file
    Validate {
        /// Path to event trace JSON
        #[arg(short, long)]
        trace: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Replay {
            trace,
            output,
            top_paths,
            summary,
            no_overhead_compensation,
        } => {
            let args = ReplayArgs {
                trace,
                output,
                top_paths,
                print_summary: summary,
                compensate_overhead: !no_overhead_compensation,
            };

            validate_args(&args)?;

            // the recorded run's exit code is ours
            let exit_code = execute_replay(&args)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }

        Commands::Validate { trace } => {
            validate_trace_file(&trace)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
