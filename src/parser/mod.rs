//! Event trace parsing and schema definitions.
//!
//! This module handles:
//! - Deserializing recorded hook events
//! - Validating call-site kinds, addresses and timestamps
//! - Producing replayable traces

pub mod event_trace;
pub mod schema;

// Re-export main types
pub use event_trace::{parse_trace, read_trace, EventTrace, RecordedSite, TraceEvent, TraceStats};
pub use schema::{RawAddress, RawEvent, RawTrace};
