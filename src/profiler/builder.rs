//! Live call tree construction driven by the host's call/return hook.
//!
//! The builder keeps a cursor on the frame that is currently executing.
//! A call moves the cursor down to the matching child (created on first
//! sight), a return moves it back up. Elapsed cycles are accumulated on the
//! frame being left; bookkeeping cost is charged to whichever frame is
//! current once the event has been handled.

use super::clock::CycleClock;
use super::location::{classify, CallSite, Interner};
use super::tree::{CallTree, FrameId};
use log::{debug, warn};

/// How a frame was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Return,
    /// Return of a frame whose caller was replaced by a tail call
    TailReturn,
}

/// Instrumentation interface the host runtime drives
///
/// Events arrive from a single execution thread, well nested.
pub trait CallHook {
    fn on_call(&mut self, site: &CallSite<'_>);
    fn on_return(&mut self, kind: ReturnKind);
}

/// Builds a [`CallTree`] from a stream of call/return events
#[derive(Debug)]
pub struct CallTreeBuilder<C: CycleClock> {
    tree: CallTree,
    current: FrameId,
    depth: usize,
    clock: C,
    interner: Interner,
    unmatched_returns: u64,
}

impl<C: CycleClock> CallTreeBuilder<C> {
    /// Create a builder with its cursor on the root
    pub fn new(clock: C) -> Self {
        Self {
            tree: CallTree::new(),
            current: FrameId::ROOT,
            depth: 0,
            clock,
            interner: Interner::new(),
            unmatched_returns: 0,
        }
    }

    /// Frame currently executing
    pub fn current(&self) -> FrameId {
        self.current
    }

    /// Number of frames currently active
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns received while no frame was active
    pub fn unmatched_returns(&self) -> u64 {
        self.unmatched_returns
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Close any frames left active and hand over the finished tree
    ///
    /// A host that aborts mid-run may never deliver the matching returns;
    /// those frames are closed at the current timestamp.
    pub fn finish(mut self) -> CallTree {
        if self.depth > 0 {
            debug!("Closing {} frames still active at end of run", self.depth);
        }
        while self.current != FrameId::ROOT {
            self.leave();
        }
        debug!(
            "Call tree finished: {} frames, {} distinct names",
            self.tree.len() - 1,
            self.interner.len()
        );
        self.tree
    }

    fn enter(&mut self, site: &CallSite<'_>) {
        let t0 = self.clock.now();

        let code = classify(site, &mut self.interner);
        let child = self.tree.child_for(self.current, &code);
        self.current = child;
        self.depth += 1;

        let frame = self.tree.frame_mut(child);
        frame.start = t0;
        let t1 = self.clock.now();
        frame.overhead += t1.saturating_sub(t0);
    }

    fn leave(&mut self) {
        if self.current == FrameId::ROOT {
            self.unmatched_returns += 1;
            if self.unmatched_returns == 1 {
                warn!("Return event with no active frame; ignoring");
            }
            return;
        }

        let stop = self.clock.now();
        let frame = self.tree.frame_mut(self.current);
        frame.elapsed += stop.saturating_sub(frame.start);
        self.current = frame.parent.unwrap_or(FrameId::ROOT);
        self.depth -= 1;

        let resumed = self.tree.frame_mut(self.current);
        resumed.overhead += self.clock.now().saturating_sub(stop);
    }
}

impl<C: CycleClock> CallHook for CallTreeBuilder<C> {
    #[inline]
    fn on_call(&mut self, site: &CallSite<'_>) {
        self.enter(site);
    }

    #[inline]
    fn on_return(&mut self, _kind: ReturnKind) {
        self.leave();
    }
}
