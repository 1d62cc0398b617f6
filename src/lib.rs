//! Flamehook
//!
//! Hook-driven call-tree profiler for embedded scripting runtimes.
//!
//! The host runtime reports every call and return through [`profiler::CallHook`].
//! The profiler builds a call tree weighted by elapsed cycles, removes its
//! own instrumentation overhead, extracts self time per frame and emits a
//! folded stack report that flamegraph tools render directly.
//!
//! ```ignore
//! use flamehook::session::ProfileSession;
//! use flamehook::utils::config::ProfilerConfig;
//!
//! let session = ProfileSession::new(ProfilerConfig::new().with_output_path("stacks.fg"));
//! let outcome = session.run(&mut runtime);
//! std::process::exit(outcome.result);
//! ```

pub mod aggregator;
pub mod commands;
pub mod host;
pub mod output;
pub mod parser;
pub mod profiler;
pub mod session;
pub mod symbols;
pub mod utils;
