//! Serde schema of recorded event traces.
//!
//! A trace is what a host runtime's hook saw during one run, written down so
//! it can be replayed through the profiler later:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "exit_code": 0,
//!   "symbols": { "0x401000": "luaB_print" },
//!   "events": [
//!     { "event": "call", "at": 0, "what": "main" },
//!     { "event": "call", "at": 4, "what": "C", "address": "0x401000" },
//!     { "event": "return", "at": 90 },
//!     { "event": "return", "at": 95 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level trace document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrace {
    /// Trace schema version
    #[serde(default)]
    pub version: Option<String>,

    /// Host exit code of the recorded run
    #[serde(default, alias = "exitCode")]
    pub exit_code: i32,

    /// Native symbol names keyed by address
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,

    /// Hook events in delivery order
    pub events: Vec<RawEvent>,
}

/// One hook notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RawEvent {
    Call {
        /// Cycle timestamp
        at: u64,

        /// Host kind tag: "C", "Lua" or "main"
        what: String,

        #[serde(default)]
        name: Option<String>,

        #[serde(default)]
        source: Option<String>,

        #[serde(default, alias = "currentline")]
        line: Option<u32>,

        #[serde(default)]
        address: Option<RawAddress>,
    },
    Return {
        at: u64,
    },
    #[serde(alias = "tailreturn")]
    TailReturn {
        at: u64,
    },
}

impl RawEvent {
    pub fn at(&self) -> u64 {
        match self {
            Self::Call { at, .. } | Self::Return { at } | Self::TailReturn { at } => *at,
        }
    }
}

/// Native address written as a number or as hex/decimal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAddress {
    Number(u64),
    Text(String),
}
