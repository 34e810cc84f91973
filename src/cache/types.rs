//! Core types for the symbol cache.
//!
//! This module contains the data model shared by the scanner, the cache and
//! the request handlers:
//! - `SymbolLocation`: where a macro or label was defined
//! - `MacroDefinition`: the replacement text of a `#define`
//! - `SymbolTable`: everything one file declares on its own
//! - `CacheEntry`: a scanned file plus its resolved includes

use std::collections::HashMap;

use tower_lsp::lsp_types::{Location, Position, Range, Url};

/// A definition site. `line` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolLocation {
    pub uri: Url,
    pub line: u32,
}

impl SymbolLocation {
    pub fn new(uri: &Url, line: usize) -> SymbolLocation {
        SymbolLocation {
            uri: uri.clone(),
            line: line as u32,
        }
    }

    /// Zero-width LSP location at the start of the defining line.
    pub fn to_lsp_location(&self) -> Location {
        let start = Position {
            line: self.line,
            character: 0,
        };
        Location {
            uri: self.uri.clone(),
            range: Range { start, end: start },
        }
    }
}

/// A macro binding introduced by `#define NAME value`.
///
/// `value` is the comment-stripped, trimmed replacement text and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroDefinition {
    pub value: String,
    pub location: SymbolLocation,
}

/// The macros and labels discoverable in a single file's text.
///
/// Names are unique per table; a later definition in the same file replaces
/// an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub macros: HashMap<String, MacroDefinition>,
    pub labels: HashMap<String, SymbolLocation>,
}

impl SymbolTable {
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty() && self.labels.is_empty()
    }
}

/// The stored result of scanning one document.
///
/// `dependencies` holds the include targets that existed on disk when the
/// entry was last updated, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub table: SymbolTable,
    pub dependencies: Vec<Url>,
}
