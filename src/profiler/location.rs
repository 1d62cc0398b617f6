//! Classification of host call-site descriptors into stable code identities.
//!
//! The host runtime describes every call with a kind tag plus whatever
//! name and source coordinates it has. Each descriptor maps to exactly one
//! [`CodeLocation`]; two calls made from the same site always produce equal
//! locations, which is what lets the call tree collapse repeated calls.

use crate::utils::config::PROGRAM_ENTRY_NAME;
use crate::utils::error::ProfileError;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Kind of code executing in a frame, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// Native function registered with the runtime
    Native,
    /// Interpreted script function
    Interpreted,
    /// Top-level chunk of the program
    ProgramEntry,
}

impl SiteKind {
    /// Parse the host's kind tag (`"C"`, `"Lua"`, `"main"`)
    ///
    /// Any other tag is a contract violation by the host and is rejected.
    pub fn from_what(what: &str) -> Result<Self, ProfileError> {
        match what {
            "C" => Ok(Self::Native),
            "Lua" => Ok(Self::Interpreted),
            "main" => Ok(Self::ProgramEntry),
            other => Err(ProfileError::UnknownSiteKind(other.to_string())),
        }
    }
}

/// A call-site descriptor delivered with every call event
///
/// Borrowed from the host for the duration of the event only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    kind: SiteKind,
    name: Option<&'a str>,
    source: Option<&'a str>,
    line: Option<u32>,
    address: usize,
}

impl<'a> CallSite<'a> {
    /// Native function entered at `address`
    pub fn native(address: usize) -> Self {
        Self {
            kind: SiteKind::Native,
            name: None,
            source: None,
            line: None,
            address,
        }
    }

    /// Interpreted function with an optional name and source coordinates
    pub fn script(name: Option<&'a str>, source: Option<&'a str>, line: Option<u32>) -> Self {
        Self {
            kind: SiteKind::Interpreted,
            name,
            source,
            line,
            address: 0,
        }
    }

    /// The program's main chunk
    pub fn entry() -> Self {
        Self {
            kind: SiteKind::ProgramEntry,
            name: None,
            source: None,
            line: None,
            address: 0,
        }
    }

    /// Build a descriptor from the host's raw fields
    ///
    /// # Errors
    /// * `ProfileError::UnknownSiteKind` - `what` is not a recognised kind
    /// * `ProfileError::MissingAddress` - a native site carries no address
    pub fn from_raw(
        what: &str,
        name: Option<&'a str>,
        source: Option<&'a str>,
        line: Option<u32>,
        address: Option<usize>,
    ) -> Result<Self, ProfileError> {
        match SiteKind::from_what(what)? {
            SiteKind::Native => address
                .map(Self::native)
                .ok_or(ProfileError::MissingAddress),
            SiteKind::Interpreted => Ok(Self::script(name, source, line)),
            SiteKind::ProgramEntry => Ok(Self::entry()),
        }
    }

    pub fn kind(&self) -> SiteKind {
        self.kind
    }
}

/// Stable identity of the code a frame executes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeLocation {
    /// Native function, keyed by entry address
    NativeFunction(usize),
    /// Script function with a usable name
    NamedScriptFunction(Rc<str>),
    /// Unnamed script function, keyed by `file:line`
    AnonymousScriptLocation(Rc<str>),
    /// The program's main chunk
    ProgramEntry,
}

impl CodeLocation {
    /// Whether the frame runs interpreted code (as opposed to native)
    pub fn is_script(&self) -> bool {
        !matches!(self, Self::NativeFunction(_))
    }

    /// Display name for script locations; `None` for native functions,
    /// which need the symbol resolver
    pub fn script_name(&self) -> Option<&str> {
        match self {
            Self::NativeFunction(_) => None,
            Self::NamedScriptFunction(name) | Self::AnonymousScriptLocation(name) => Some(name),
            Self::ProgramEntry => Some(PROGRAM_ENTRY_NAME),
        }
    }
}

impl fmt::Display for CodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeFunction(addr) => write!(f, "{:#x}", addr),
            other => f.write_str(other.script_name().unwrap_or_default()),
        }
    }
}

/// Deduplicating store for location text
///
/// Names and `file:line` strings are stored once and shared by every frame
/// that refers to them.
#[derive(Debug, Default)]
pub struct Interner {
    strings: HashSet<Rc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some(existing) = self.strings.get(text) {
            return Rc::clone(existing);
        }
        let shared: Rc<str> = Rc::from(text);
        self.strings.insert(Rc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Classify a call-site descriptor
///
/// **Public** - used by the call tree builder on every call event
pub fn classify(site: &CallSite<'_>, interner: &mut Interner) -> CodeLocation {
    match site.kind {
        SiteKind::Native => CodeLocation::NativeFunction(site.address),
        SiteKind::ProgramEntry => CodeLocation::ProgramEntry,
        SiteKind::Interpreted => match site.name.filter(|name| is_usable_name(name)) {
            Some(name) => CodeLocation::NamedScriptFunction(interner.intern(name)),
            None => {
                let label = anonymous_label(site.source, site.line);
                CodeLocation::AnonymousScriptLocation(interner.intern(&label))
            }
        },
    }
}

/// Names the runtime could not determine are reported empty or starting with '?'
fn is_usable_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('?')
}

/// Format `<basename>:<line>` for an unnamed function
fn anonymous_label(source: Option<&str>, line: Option<u32>) -> String {
    let source = source.unwrap_or("?");
    let basename = source
        .rfind(['/', '\\'])
        .map_or(source, |idx| &source[idx + 1..]);

    match line {
        Some(line) => format!("{}:{}", basename, line),
        None => format!("{}:?", basename),
    }
}
