//! Cached native symbol resolver.

use super::lookup::{ProcessSymbols, SymbolLookup};
use log::debug;
use std::collections::HashMap;

/// Resolves native addresses to display names, once per address
///
/// Addresses the lookup cannot name get a hexadecimal fallback, which is
/// cached like any other result, so every address resolves to a non-empty
/// name and the underlying lookup runs at most once per address.
#[derive(Debug)]
pub struct SymbolResolver<L: SymbolLookup = ProcessSymbols> {
    lookup: L,
    cache: HashMap<usize, String>,
    fallbacks: usize,
}

impl Default for SymbolResolver<ProcessSymbols> {
    fn default() -> Self {
        Self::new(ProcessSymbols::new())
    }
}

impl<L: SymbolLookup> SymbolResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: HashMap::new(),
            fallbacks: 0,
        }
    }

    /// Display name for `address`
    pub fn resolve(&mut self, address: usize) -> &str {
        let Self {
            lookup,
            cache,
            fallbacks,
        } = self;

        cache.entry(address).or_insert_with(|| {
            match lookup.lookup(address).filter(|name| !name.is_empty()) {
                Some(name) => name,
                None => {
                    *fallbacks += 1;
                    debug!("Falling back to raw address for {:#x}", address);
                    fallback_name(address)
                }
            }
        })
    }

    /// Number of distinct addresses resolved so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Number of addresses that received a fallback name
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }
}

/// Hexadecimal name for an address without a symbol
pub fn fallback_name(address: usize) -> String {
    format!("{:#x}", address)
}
