//! Post-run processing of the call tree.
//!
//! This module transforms the finished call tree into:
//! - Self times with instrumentation overhead removed
//! - Folded stack records (for flamegraph tools)
//! - Hot path analysis and cycle distribution statistics

pub mod folder;
pub mod metrics;
pub mod reducer;

// Re-export main types and functions
pub use folder::{build_folded_stacks, flatten_stacks, fold_stacks, FlatStack};
pub use metrics::{calculate_cycle_distribution, calculate_hot_paths, CycleDistribution, HotPath};
pub use reducer::{calculate_children_time, reduce, reduce_overhead};
