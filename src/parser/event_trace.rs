//! Event trace parser.
//!
//! Parses recorded hook events into validated [`TraceEvent`]s. Every call
//! site is classified up front, so a trace with an unknown kind tag is
//! rejected before anything is replayed.

use super::schema::{RawAddress, RawEvent, RawTrace};
use crate::profiler::{CallSite, SiteKind};
use crate::symbols::SymbolTable;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::path::Path;

/// Call-site descriptor owned by a parsed trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSite {
    kind: SiteKind,
    name: Option<String>,
    source: Option<String>,
    line: Option<u32>,
    address: usize,
}

impl RecordedSite {
    /// Borrow as the descriptor the hook expects
    pub fn call_site(&self) -> CallSite<'_> {
        match self.kind {
            SiteKind::Native => CallSite::native(self.address),
            SiteKind::Interpreted => {
                CallSite::script(self.name.as_deref(), self.source.as_deref(), self.line)
            }
            SiteKind::ProgramEntry => CallSite::entry(),
        }
    }

    pub fn kind(&self) -> SiteKind {
        self.kind
    }
}

/// A validated hook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Call { at: u64, site: RecordedSite },
    Return { at: u64 },
    TailReturn { at: u64 },
}

impl TraceEvent {
    pub fn at(&self) -> u64 {
        match self {
            Self::Call { at, .. } | Self::Return { at } | Self::TailReturn { at } => *at,
        }
    }
}

/// A parsed, validated trace
#[derive(Debug, Clone)]
pub struct EventTrace {
    pub version: String,
    pub exit_code: i32,
    pub symbols: SymbolTable,
    pub events: Vec<TraceEvent>,
}

/// Shape of a trace, for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub calls: usize,
    pub returns: usize,
    pub max_depth: usize,
    pub duration: u64,
}

impl EventTrace {
    /// Count calls and returns and find the deepest nesting
    pub fn stats(&self) -> TraceStats {
        let mut stats = TraceStats::default();
        let mut depth = 0usize;

        for event in &self.events {
            match event {
                TraceEvent::Call { .. } => {
                    stats.calls += 1;
                    depth += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                }
                TraceEvent::Return { .. } | TraceEvent::TailReturn { .. } => {
                    stats.returns += 1;
                    depth = depth.saturating_sub(1);
                }
            }
        }

        if let (Some(first), Some(last)) = (self.events.first(), self.events.last()) {
            stats.duration = last.at() - first.at();
        }
        stats
    }
}

/// Parse a trace from JSON text
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `ParseError::JsonError` - Invalid JSON structure
/// * `ParseError::InvalidCallSite` - Unknown kind tag or native call without address
/// * `ParseError::InvalidAddress` - Unparseable address
/// * `ParseError::InvalidFormat` - Timestamps going backwards
pub fn parse_trace(json: &str) -> Result<EventTrace, ParseError> {
    let raw: RawTrace = serde_json::from_str(json)?;
    from_raw(raw)
}

/// Read and parse a trace file
pub fn read_trace(path: impl AsRef<Path>) -> Result<EventTrace, ParseError> {
    let path = path.as_ref();
    debug!("Reading event trace from: {}", path.display());
    let json = std::fs::read_to_string(path)?;
    parse_trace(&json)
}

/// Validate and convert a deserialized trace
///
/// **Private** - internal helper for parse_trace
fn from_raw(raw: RawTrace) -> Result<EventTrace, ParseError> {
    let version = raw.version.unwrap_or_else(|| SCHEMA_VERSION.to_string());
    if major(&version) != major(SCHEMA_VERSION) {
        warn!(
            "Trace schema version {} differs from supported {}",
            version, SCHEMA_VERSION
        );
    }

    let symbols = raw
        .symbols
        .iter()
        .map(|(addr, name)| Ok((parse_address_text(addr)?, name.clone())))
        .collect::<Result<SymbolTable, ParseError>>()?;

    let mut events = Vec::with_capacity(raw.events.len());
    let mut last_at = 0u64;

    for (index, event) in raw.events.into_iter().enumerate() {
        let at = event.at();
        if at < last_at {
            return Err(ParseError::InvalidFormat(format!(
                "timestamp of event {} goes backwards ({} < {})",
                index, at, last_at
            )));
        }
        last_at = at;
        events.push(convert_event(index, event)?);
    }

    debug!(
        "Parsed {} events and {} symbols",
        events.len(),
        symbols.len()
    );

    Ok(EventTrace {
        version,
        exit_code: raw.exit_code,
        symbols,
        events,
    })
}

/// **Private** - classify one raw event
fn convert_event(index: usize, event: RawEvent) -> Result<TraceEvent, ParseError> {
    let event = match event {
        RawEvent::Call {
            at,
            what,
            name,
            source,
            line,
            address,
        } => {
            let address = address.as_ref().map(parse_address).transpose()?;
            let kind = CallSite::from_raw(&what, name.as_deref(), source.as_deref(), line, address)
                .map_err(|err| ParseError::InvalidCallSite { index, source: err })?
                .kind();
            TraceEvent::Call {
                at,
                site: RecordedSite {
                    kind,
                    name,
                    source,
                    line,
                    address: address.unwrap_or_default(),
                },
            }
        }
        RawEvent::Return { at } => TraceEvent::Return { at },
        RawEvent::TailReturn { at } => TraceEvent::TailReturn { at },
    };
    Ok(event)
}

fn parse_address(address: &RawAddress) -> Result<usize, ParseError> {
    match address {
        RawAddress::Number(value) => usize::try_from(*value)
            .map_err(|_| ParseError::InvalidAddress(value.to_string())),
        RawAddress::Text(text) => parse_address_text(text),
    }
}

/// Parse `0x`-prefixed hex or plain decimal
fn parse_address_text(text: &str) -> Result<usize, ParseError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| ParseError::InvalidAddress(text.to_string()))
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
