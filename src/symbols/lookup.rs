//! Platform and table-driven native symbol lookups.

use log::debug;
use std::collections::HashMap;
use std::ffi::c_void;

/// A source of display names for native function addresses
pub trait SymbolLookup {
    /// Look up the symbol containing `address`; `None` when unknown
    fn lookup(&mut self, address: usize) -> Option<String>;
}

/// Symbols of the running process, read from its debug information
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSymbols;

impl ProcessSymbols {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolLookup for ProcessSymbols {
    fn lookup(&mut self, address: usize) -> Option<String> {
        let mut name = None;

        // `resolve` treats its argument as a return address and steps back a
        // byte, so aim one past the function entry.
        backtrace::resolve(address.wrapping_add(1) as *mut c_void, |symbol| {
            if name.is_none() {
                name = symbol.name().map(|n| n.to_string());
            }
        });

        if name.is_none() {
            debug!("No process symbol for {:#x}", address);
        }
        name
    }
}

/// Explicit address-to-name table, e.g. recorded alongside a trace
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: HashMap<usize, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: usize, name: impl Into<String>) {
        self.names.insert(address, name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(usize, String)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl SymbolLookup for SymbolTable {
    fn lookup(&mut self, address: usize) -> Option<String> {
        self.names.get(&address).cloned()
    }
}
