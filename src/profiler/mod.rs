//! Live call-tree collection.
//!
//! This module turns the host runtime's call/return notifications into a
//! call tree weighted by elapsed cycles:
//! - Call-site classification into stable code identities
//! - Cycle counters for timestamping events
//! - The arena call tree and the cursor-driven builder

pub mod builder;
pub mod clock;
pub mod location;
pub mod tree;

// Re-export main types
pub use builder::{CallHook, CallTreeBuilder, ReturnKind};
pub use clock::{CycleClock, ManualClock, MonotonicClock, TscClock};
pub use location::{classify, CallSite, CodeLocation, Interner, SiteKind};
pub use tree::{CallTree, FrameId, StackFrame};
