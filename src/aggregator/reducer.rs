//! Post-run reduction of the call tree.
//!
//! Two passes run once the host has finished executing:
//! 1. Overhead compensation removes the measured instrumentation cost from
//!    every frame.
//! 2. Self-time extraction turns inclusive elapsed time into exclusive time
//!    and records what was moved to descendants in `children_time`.
//!
//! Both passes clamp at zero. Cycle counters on real hardware are noisy and
//! a child can occasionally appear to outlast its parent by a few cycles.

use crate::profiler::CallTree;
use log::debug;

/// Subtract each frame's overhead from its elapsed time
///
/// **Public** - first reduction pass, applied to every frame including the root
pub fn reduce_overhead(tree: &mut CallTree) {
    let mut total_overhead = 0u64;

    for frame in tree.frames_mut() {
        total_overhead = total_overhead.saturating_add(frame.overhead);
        frame.elapsed = frame.elapsed.saturating_sub(frame.overhead);
    }

    debug!("Removed {} cycles of instrumentation overhead", total_overhead);
}

/// Convert inclusive elapsed time into self time
///
/// **Public** - second reduction pass
///
/// For every frame, `children_time` becomes the sum over all children of
/// their `elapsed + children_time`, and `elapsed` is reduced by that amount.
///
/// Children always have larger ids than their parents, so walking the arena
/// backwards visits every child before its parent.
pub fn calculate_children_time(tree: &mut CallTree) {
    let ids: Vec<_> = tree.iter().rev().map(|(id, _)| id).collect();

    for id in ids {
        let children_time = tree.children_total(id);
        let frame = tree.frame_mut(id);
        frame.children_time = children_time;
        frame.elapsed = frame.elapsed.saturating_sub(children_time);
    }
}

/// Run both reduction passes
///
/// **Public** - main entry point used by the session
pub fn reduce(tree: &mut CallTree, compensate_overhead: bool) {
    if compensate_overhead {
        reduce_overhead(tree);
    }
    calculate_children_time(tree);
}
