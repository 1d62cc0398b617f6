//! Flatten the reduced call tree into folded stack records.
//!
//! Folded format is the input format for flamegraph tools.
//! Format: "root;LUA:main;C:luaB_print 1000"
//!
//! Each frame of the tree becomes one record whose path names every
//! ancestor from the root marker down to the frame itself, weighted by the
//! frame's self time. Records sharing a path are then merged.

use crate::profiler::{CallTree, CodeLocation, FrameId, StackFrame};
use crate::symbols::{SymbolLookup, SymbolResolver};
use crate::utils::config::{NATIVE_TAG, ROOT_MARKER, SCRIPT_TAG};
use log::debug;
use serde::{Deserialize, Serialize};

/// A single folded stack entry
///
/// **Public** - produced by the folder, consumed by the report writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatStack {
    /// Semicolon-separated path from the root marker to the frame
    pub path: String,

    /// Self cycles attributed to this path
    pub elapsed: u64,
}

impl FlatStack {
    /// Create a new flat stack record
    pub fn new(path: impl Into<String>, elapsed: u64) -> Self {
        Self {
            path: path.into(),
            elapsed,
        }
    }

    /// Render as a report line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!("{} {}", self.path, self.elapsed)
    }

    /// Last segment of the path
    pub fn leaf(&self) -> &str {
        self.path.rsplit(';').next().unwrap_or(&self.path)
    }
}

/// Produce one record per frame, in pre-order
///
/// **Public** - first half of the folding pipeline
///
/// Native frames are named through `resolver`; script frames use their own
/// location text.
pub fn flatten_stacks<L: SymbolLookup>(
    tree: &CallTree,
    resolver: &mut SymbolResolver<L>,
) -> Vec<FlatStack> {
    let mut records: Vec<FlatStack> = Vec::with_capacity(tree.len().saturating_sub(1));

    // (frame, index of the parent's record); explicit stack so deep
    // recursion in the profiled program cannot overflow ours
    let mut pending: Vec<(FrameId, Option<usize>)> = tree
        .root()
        .children
        .iter()
        .rev()
        .map(|&id| (id, None))
        .collect();

    while let Some((id, parent_record)) = pending.pop() {
        let frame = tree.frame(id);
        let prefix = parent_record.map(|idx| records[idx].path.as_str());
        let Some(path) = frame_path(frame, prefix, resolver) else {
            continue;
        };

        let index = records.len();
        records.push(FlatStack::new(path, frame.elapsed));
        pending.extend(frame.children.iter().rev().map(|&child| (child, Some(index))));
    }

    debug!("Flattened {} frames", records.len());
    records
}

/// Build `prefix;TAG:name` for a frame
///
/// **Private** - `None` for the root sentinel
fn frame_path<L: SymbolLookup>(
    frame: &StackFrame,
    prefix: Option<&str>,
    resolver: &mut SymbolResolver<L>,
) -> Option<String> {
    let code = frame.code.as_ref()?;
    let prefix = prefix.unwrap_or(ROOT_MARKER);

    let path = match code {
        CodeLocation::NativeFunction(address) => {
            format!("{};{}{}", prefix, NATIVE_TAG, resolver.resolve(*address))
        }
        script => format!(
            "{};{}{}",
            prefix,
            SCRIPT_TAG,
            script.script_name().unwrap_or_default()
        ),
    };
    Some(path)
}

/// Sort records by path and merge identical paths
///
/// **Public** - second half of the folding pipeline
///
/// The result is sorted bytewise by path and holds one record per distinct
/// path with the summed elapsed time. Folding an already folded set is a
/// no-op.
pub fn fold_stacks(mut stacks: Vec<FlatStack>) -> Vec<FlatStack> {
    let flattened = stacks.len();

    stacks.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    stacks.dedup_by(|next, kept| {
        if next.path == kept.path {
            kept.elapsed += next.elapsed;
            true
        } else {
            false
        }
    });

    debug!("Folded {} records into {} unique paths", flattened, stacks.len());
    stacks
}

/// Flatten then fold
///
/// **Public** - main entry point for report generation
pub fn build_folded_stacks<L: SymbolLookup>(
    tree: &CallTree,
    resolver: &mut SymbolResolver<L>,
) -> Vec<FlatStack> {
    fold_stacks(flatten_stacks(tree, resolver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn named(name: &str) -> CodeLocation {
        CodeLocation::NamedScriptFunction(Rc::from(name))
    }

    fn resolver() -> SymbolResolver<SymbolTable> {
        let mut table = SymbolTable::new();
        table.insert(0x10, "luaB_print");
        SymbolResolver::new(table)
    }

    #[test]
    fn test_to_line() {
        let stack = FlatStack::new("root;LUA:main;C:luaB_print", 1000);
        assert_eq!(stack.to_line(), "root;LUA:main;C:luaB_print 1000");
        assert_eq!(stack.leaf(), "C:luaB_print");
    }

    #[test]
    fn test_flatten_preorder_with_tags() {
        let mut tree = CallTree::new();
        let main = tree.child_for(FrameId::ROOT, &CodeLocation::ProgramEntry);
        let print = tree.child_for(main, &CodeLocation::NativeFunction(0x10));
        let unknown = tree.child_for(main, &CodeLocation::NativeFunction(0x99));
        let anon = tree.child_for(
            print,
            &CodeLocation::AnonymousScriptLocation(Rc::from("init.lua:4")),
        );
        tree.frame_mut(main).elapsed = 5;
        tree.frame_mut(print).elapsed = 7;
        tree.frame_mut(unknown).elapsed = 1;
        tree.frame_mut(anon).elapsed = 3;

        let stacks = flatten_stacks(&tree, &mut resolver());

        assert_eq!(
            stacks,
            vec![
                FlatStack::new("root;LUA:main", 5),
                FlatStack::new("root;LUA:main;C:luaB_print", 7),
                FlatStack::new("root;LUA:main;C:luaB_print;LUA:init.lua:4", 3),
                FlatStack::new("root;LUA:main;C:0x99", 1),
            ]
        );
    }

    #[test]
    fn test_flatten_empty_tree() {
        let tree = CallTree::new();
        assert!(flatten_stacks(&tree, &mut resolver()).is_empty());
    }

    #[test]
    fn test_fold_merges_and_sorts() {
        let stacks = vec![
            FlatStack::new("root;LUA:b", 1),
            FlatStack::new("root;LUA:a", 2),
            FlatStack::new("root;LUA:b", 3),
            FlatStack::new("root;LUA:a;LUA:c", 4),
            FlatStack::new("root;LUA:b", 5),
        ];

        let folded = fold_stacks(stacks);

        assert_eq!(
            folded,
            vec![
                FlatStack::new("root;LUA:a", 2),
                FlatStack::new("root;LUA:a;LUA:c", 4),
                FlatStack::new("root;LUA:b", 9),
            ]
        );
        assert!(folded.windows(2).all(|pair| pair[0].path < pair[1].path));
    }

    #[test]
    fn test_fold_is_idempotent() {
        let stacks = vec![
            FlatStack::new("root;LUA:x", 10),
            FlatStack::new("root;LUA:x", 10),
            FlatStack::new("root;C:0x1", 1),
        ];

        let once = fold_stacks(stacks);
        let twice = fold_stacks(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fold_empty_and_single() {
        assert!(fold_stacks(Vec::new()).is_empty());
        assert_eq!(
            fold_stacks(vec![FlatStack::new("root;LUA:a", 1)]),
            vec![FlatStack::new("root;LUA:a", 1)]
        );
    }

    #[test]
    fn test_build_folded_merges_colliding_names() {
        // a named function and an anonymous location that format identically
        let mut tree = CallTree::new();
        let named_frame = tree.child_for(FrameId::ROOT, &named("f.lua:1"));
        let anon_frame = tree.child_for(
            FrameId::ROOT,
            &CodeLocation::AnonymousScriptLocation(Rc::from("f.lua:1")),
        );
        tree.frame_mut(named_frame).elapsed = 4;
        tree.frame_mut(anon_frame).elapsed = 6;

        let folded = build_folded_stacks(&tree, &mut resolver());
        assert_eq!(folded, vec![FlatStack::new("root;LUA:f.lua:1", 10)]);
    }
}
