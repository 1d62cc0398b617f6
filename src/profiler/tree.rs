//! Arena-backed call tree.
//!
//! Frames live in a single `Vec` and refer to each other by [`FrameId`].
//! A parent owns the ids of its children; a child only records its parent's
//! id, so there is no reference cycle to manage.
//!
//! Frames are only ever appended, so a child always has a larger id than its
//! parent. The reducer relies on this to process children before parents by
//! walking the arena backwards.

use super::location::CodeLocation;

/// Index of a frame inside a [`CallTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    /// The sentinel frame representing "outside any call"
    pub const ROOT: FrameId = FrameId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the call tree
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// Code executed by this frame; `None` only for the root sentinel
    pub code: Option<CodeLocation>,

    /// Timestamp of the current activation
    pub start: u64,

    /// Cycles attributed to this node across all activations
    pub elapsed: u64,

    /// Instrumentation cost incurred while this frame was current
    pub overhead: u64,

    /// Cycles attributed to descendants; valid after the reducer runs
    pub children_time: u64,

    /// Non-owning back-reference
    pub parent: Option<FrameId>,

    /// Children in first-seen order
    pub children: Vec<FrameId>,
}

impl StackFrame {
    fn new(code: Option<CodeLocation>, parent: Option<FrameId>) -> Self {
        Self {
            code,
            start: 0,
            elapsed: 0,
            overhead: 0,
            children_time: 0,
            parent,
            children: Vec::new(),
        }
    }

    /// Inclusive time: self time plus time spent in descendants
    pub fn total(&self) -> u64 {
        self.elapsed + self.children_time
    }
}

/// Call tree owning every frame of a profiling session
#[derive(Debug, Clone)]
pub struct CallTree {
    frames: Vec<StackFrame>,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    /// Create a tree holding only the root sentinel
    pub fn new() -> Self {
        Self {
            frames: vec![StackFrame::new(None, None)],
        }
    }

    pub fn root(&self) -> &StackFrame {
        &self.frames[FrameId::ROOT.0]
    }

    pub fn frame(&self, id: FrameId) -> &StackFrame {
        &self.frames[id.0]
    }

    pub fn frame_mut(&mut self, id: FrameId) -> &mut StackFrame {
        &mut self.frames[id.0]
    }

    /// Number of frames, including the root sentinel
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no call has been recorded
    pub fn is_empty(&self) -> bool {
        self.frames.len() == 1
    }

    /// Find the child of `parent` executing `code`, creating it on first sight
    pub fn child_for(&mut self, parent: FrameId, code: &CodeLocation) -> FrameId {
        let existing = self.frames[parent.0]
            .children
            .iter()
            .copied()
            .find(|&child| self.frames[child.0].code.as_ref() == Some(code));

        if let Some(child) = existing {
            return child;
        }

        let child = FrameId(self.frames.len());
        self.frames
            .push(StackFrame::new(Some(code.clone()), Some(parent)));
        self.frames[parent.0].children.push(child);
        child
    }

    /// Iterate `(id, frame)` pairs in allocation order (parents before children)
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (FrameId, &StackFrame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(idx, frame)| (FrameId(idx), frame))
    }

    /// Sum of `total()` over the direct children of `id`
    pub fn children_total(&self, id: FrameId) -> u64 {
        self.frames[id.0]
            .children
            .iter()
            .map(|child| self.frames[child.0].total())
            .sum()
    }

    /// Mutable access to every frame
    pub(crate) fn frames_mut(&mut self) -> &mut [StackFrame] {
        &mut self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn named(name: &str) -> CodeLocation {
        CodeLocation::NamedScriptFunction(Rc::from(name))
    }

    #[test]
    fn test_new_tree_has_only_root() {
        let tree = CallTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert!(tree.root().code.is_none());
        assert!(tree.root().parent.is_none());
    }

    #[test]
    fn test_child_for_reuses_existing_node() {
        let mut tree = CallTree::new();
        let a = tree.child_for(FrameId::ROOT, &named("a"));
        let again = tree.child_for(FrameId::ROOT, &named("a"));
        let b = tree.child_for(FrameId::ROOT, &named("b"));

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root().children, vec![a, b]);
        assert_eq!(tree.frame(b).parent, Some(FrameId::ROOT));
    }

    #[test]
    fn test_same_code_under_different_parents_is_distinct() {
        let mut tree = CallTree::new();
        let a = tree.child_for(FrameId::ROOT, &named("a"));
        let nested = tree.child_for(a, &named("a"));

        assert_ne!(a, nested);
        assert!(nested > a);
        assert_eq!(tree.frame(nested).parent, Some(a));
    }

    #[test]
    fn test_children_total_sums_all_children() {
        let mut tree = CallTree::new();
        let a = tree.child_for(FrameId::ROOT, &named("a"));
        let b = tree.child_for(FrameId::ROOT, &named("b"));
        tree.frame_mut(a).elapsed = 10;
        tree.frame_mut(a).children_time = 5;
        tree.frame_mut(b).elapsed = 7;

        assert_eq!(tree.children_total(FrameId::ROOT), 22);
    }
}
