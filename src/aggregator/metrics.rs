//! Calculate hot paths and cycle distribution from folded stacks.
//!
//! Hot paths are the call paths with the most self time.
//! These are the primary targets for optimization.

use super::folder::FlatStack;
use log::debug;

/// A folded path ranked by self time
#[derive(Debug, Clone, PartialEq)]
pub struct HotPath {
    /// Folded path
    pub path: String,

    /// Self cycles
    pub cycles: u64,

    /// Share of total cycles
    pub percentage: f64,
}

/// Calculate hot paths from folded stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Folded stacks (any order)
/// * `top_n` - Number of top paths to return
///
/// # Returns
/// Vector of hot paths, sorted by cycles (descending, ties by path)
pub fn calculate_hot_paths(stacks: &[FlatStack], top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    let total: u64 = stacks.iter().map(|s| s.elapsed).sum();

    let mut ranked: Vec<&FlatStack> = stacks.iter().collect();
    ranked.sort_by(|a, b| b.elapsed.cmp(&a.elapsed).then_with(|| a.path.cmp(&b.path)));

    ranked
        .into_iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total))
        .collect()
}

/// Create a HotPath from a FlatStack
pub fn create_hot_path(stack: &FlatStack, total_cycles: u64) -> HotPath {
    let percentage = if total_cycles > 0 {
        (stack.elapsed as f64 / total_cycles as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        path: stack.path.clone(),
        cycles: stack.elapsed,
        percentage,
    }
}

/// Cycle distribution statistics
///
/// **Public** - returned from calculate_cycle_distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleDistribution {
    /// Total self cycles across all stacks
    pub total_cycles: u64,

    /// Number of unique stacks
    pub stack_count: usize,

    /// Mean cycles per stack
    pub mean_cycles_per_stack: u64,

    /// Median cycles per stack
    pub median_cycles_per_stack: u64,

    /// Cycles in the hottest 10% of stacks
    pub top_10_percent_cycles: u64,

    /// Percentage of total cycles in the hottest 10%
    pub top_10_percent_percentage: f64,
}

/// Calculate cycle distribution statistics
///
/// **Public** - provides summary statistics
pub fn calculate_cycle_distribution(stacks: &[FlatStack]) -> CycleDistribution {
    if stacks.is_empty() {
        return CycleDistribution::default();
    }

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.elapsed).collect();
    weights.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = weights.iter().sum();
    let count = weights.len();
    let mean = total / count as u64;
    let median = weights[count / 2];

    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_cycles: u64 = weights.iter().take(top_count).sum();

    CycleDistribution {
        total_cycles: total,
        stack_count: count,
        mean_cycles_per_stack: mean,
        median_cycles_per_stack: median,
        top_10_percent_cycles: top_cycles,
        top_10_percent_percentage: if total > 0 {
            (top_cycles as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

impl CycleDistribution {
    /// Returns true if the hottest 10% of stacks take more than 80% of cycles
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {} cycles | Stacks: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_cycles,
            self.stack_count,
            self.mean_cycles_per_stack,
            self.median_cycles_per_stack,
            self.top_10_percent_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            FlatStack::new("root;LUA:compute", 2000),
            FlatStack::new("root;LUA:execute", 5000),
            FlatStack::new("root;C:luaB_print", 3000),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].path, "root;LUA:execute");
        assert_eq!(hot_paths[0].cycles, 5000);
        assert_eq!(hot_paths[0].percentage, 50.0);
        assert_eq!(hot_paths[1].path, "root;C:luaB_print");
    }

    #[test]
    fn test_calculate_cycle_distribution() {
        let stacks = vec![
            FlatStack::new("stack1", 8500),
            FlatStack::new("stack2", 1000),
            FlatStack::new("stack3", 250),
            FlatStack::new("stack4", 250),
        ];

        let dist = calculate_cycle_distribution(&stacks);

        assert_eq!(dist.total_cycles, 10000);
        assert_eq!(dist.stack_count, 4);
        assert_eq!(dist.mean_cycles_per_stack, 2500);
        assert_eq!(dist.top_10_percent_cycles, 8500);
        assert!(dist.is_highly_concentrated());
    }

    #[test]
    fn test_cycle_distribution_empty() {
        let dist = calculate_cycle_distribution(&[]);
        assert_eq!(dist.total_cycles, 0);
        assert_eq!(dist.stack_count, 0);
        assert!(!dist.is_highly_concentrated());
    }

    #[test]
    fn test_create_hot_path_zero_total() {
        let hot_path = create_hot_path(&FlatStack::new("root;LUA:idle", 0), 0);
        assert_eq!(hot_path.percentage, 0.0);
    }
}
