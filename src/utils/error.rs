//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while turning host call-site descriptors into profiler identities
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Unknown call-site kind from host runtime: {0:?}")]
    UnknownSiteKind(String),

    #[error("Native call site is missing its function address")]
    MissingAddress,
}

/// Errors that can occur during event trace parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Invalid call site at event {index}: {source}")]
    InvalidCallSite {
        index: usize,
        #[source]
        source: ProfileError,
    },

    #[error("Invalid native address: {0}")]
    InvalidAddress(String),

    #[error("Failed to read trace: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
