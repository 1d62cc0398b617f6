//! Native symbol resolution.
//!
//! Native frames are identified by entry address only; display names are
//! looked up lazily when the report is built and cached for the rest of the
//! session.

pub mod lookup;
pub mod resolver;

// Re-export main types
pub use lookup::{ProcessSymbols, SymbolLookup, SymbolTable};
pub use resolver::SymbolResolver;
