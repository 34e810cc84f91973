//! Hover provider.
//!
//! | Target | Shows |
//! |--------|-------|
//! | Macro | `#define` name, value and defining file |
//! | Label | Defining line |
//! | Instruction | Mnemonic summary |
//! | Register | Register class |
//!
//! Hover can be disabled via [`Settings::hover`].

use std::path::Path;

use pathdiff::diff_paths;
use ropey::Rope;
use tower_lsp::lsp_types::{
    Hover, HoverContents, HoverParams, MarkupContent, MarkupKind, Position, Range,
};

use crate::cache::{SymbolLocation, SymbolTable};
use crate::config::Settings;
use crate::cursor::word_at_position;
use crate::instructions;

/// Generate hover content for the word at the cursor position.
///
/// `table` is the merged symbol table of the hovered document and `root_dir`
/// the workspace root, used to print defining files relative to it.
pub fn hover(
    table: &SymbolTable,
    rope: &Rope,
    params: &HoverParams,
    settings: &Settings,
    root_dir: Option<&Path>,
) -> Option<Hover> {
    if !settings.hover {
        return None;
    }

    let position = params.text_document_position_params.position;
    let word = word_at_position(rope, position)?;

    let value = if let Some(definition) = table.macros.get(&word.text) {
        [
            format!("**#define** `{}`", word.text),
            "---".to_string(),
            format!("**Value:** `{}`", definition.value),
            String::new(),
            format!("Defined in {}", describe_location(&definition.location, root_dir)),
        ]
        .join("\n")
    } else if let Some(location) = table.labels.get(&word.text) {
        format!(
            "**label** `{}`\n\nDefined in {}",
            word.text,
            describe_location(location, root_dir)
        )
    } else if let Some(register) = word
        .text
        .starts_with('%')
        .then(|| instructions::register(&word.text))
        .flatten()
    {
        format!(
            "**register** `{register}`\n\n{}",
            instructions::register_summary(register)
        )
    } else if let Some(opcode) = instructions::opcode(&word.text) {
        format!("**instruction** `{}`\n\n{}", opcode.name, opcode.summary)
    } else {
        return None;
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(Range {
            start: Position {
                line: position.line,
                character: word.start,
            },
            end: Position {
                line: position.line,
                character: word.end,
            },
        }),
    })
}

/// `file:line` with a 1-based line, relative to the workspace when possible.
fn describe_location(location: &SymbolLocation, root_dir: Option<&Path>) -> String {
    let file = match location.uri.to_file_path() {
        Ok(path) => root_dir
            .and_then(|root| diff_paths(&path, root))
            .filter(|relative| !relative.starts_with(".."))
            .unwrap_or(path)
            .display()
            .to_string(),
        Err(_) => location.uri.to_string(),
    };

    format!("`{}:{}`", file, location.line + 1)
}
