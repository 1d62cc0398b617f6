//! Host runtimes the profiler can drive.

pub mod replay;

pub use replay::{ReplayOutcome, TraceReplay};
