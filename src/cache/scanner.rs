//! Line-oriented extraction of macros, labels and include directives.
//!
//! Every function here is pure: text goes in, names and 0-based line numbers
//! come out. Text that does not match a directive is skipped, so malformed
//! input yields fewer entries and never an error.
//!
//! | Directive | Example | Namespace |
//! |-----------|---------|-----------|
//! | define | `#define MAX 10` | macros |
//! | extern | `.extern printf` | labels |
//! | label | `loop:` | labels |
//! | section | `.section .rodata` | labels |
//! | include | `#include "defs.h"` | includes |

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tower_lsp::lsp_types::Url;

use super::types::{MacroDefinition, SymbolLocation, SymbolTable};

static DEFINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*define\s+(?<name>[A-Za-z_]\w*)(?:\s*(?<value>.*))?$").unwrap()
});

static EXTERN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\.extern\s+(?<name>[A-Za-z_][A-Za-z0-9_.]*)").unwrap());

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?<name>[A-Za-z_][A-Za-z0-9_.]*)\s*:").unwrap());

// Section names usually start with a dot (`.text`, `.rodata`).
static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\.section\s+(?<name>[A-Za-z0-9_.]+)").unwrap());

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*#\s*include\s+["<](?<file>.*?\.(?:h|inc))[">]"#).unwrap()
});

/// Scan one file's own symbols. Includes are not followed.
pub fn scan(text: &str, uri: &Url) -> SymbolTable {
    SymbolTable {
        macros: scan_macros(text, uri),
        labels: scan_labels(text, uri),
    }
}

/// Collect `#define` directives. The last definition of a name wins.
pub fn scan_macros(text: &str, uri: &Url) -> HashMap<String, MacroDefinition> {
    let mut macros = HashMap::new();

    for (line_number, line) in lines(text).enumerate() {
        let Some(captures) = DEFINE_RE.captures(line) else {
            continue;
        };
        let Some(name) = captures.name("name") else {
            continue;
        };
        let value = captures
            .name("value")
            .map(|value| strip_comments(value.as_str()))
            .unwrap_or_default();

        macros.insert(
            name.as_str().to_string(),
            MacroDefinition {
                value: value.trim().to_string(),
                location: SymbolLocation::new(uri, line_number),
            },
        );
    }

    macros
}

/// Collect externs, labels and sections into one namespace.
///
/// Each form is its own pass over the text, in that order, so a section
/// shadows a label of the same name regardless of where either appears.
pub fn scan_labels(text: &str, uri: &Url) -> HashMap<String, SymbolLocation> {
    let mut labels = HashMap::new();

    for regex in [&*EXTERN_RE, &*LABEL_RE, &*SECTION_RE] {
        for (line_number, line) in lines(text).enumerate() {
            if let Some(name) = regex.captures(line).and_then(|c| c.name("name")) {
                labels.insert(
                    name.as_str().to_string(),
                    SymbolLocation::new(uri, line_number),
                );
            }
        }
    }

    labels
}

/// Collect `.h` / `.inc` include targets in source order, duplicates kept.
pub fn scan_includes(text: &str) -> Vec<String> {
    lines(text)
        .filter_map(|line| INCLUDE_RE.captures(line))
        .filter_map(|c| c.name("file").map(|file| file.as_str().to_string()))
        .collect()
}

/// Lines split on `\r\n`, `\n` or a lone `\r`.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK_RE.split(text)
}

fn strip_comments(value: &str) -> &str {
    let value = value.find("//").map_or(value, |idx| &value[..idx]);
    value.find("/*").map_or(value, |idx| &value[..idx])
}
