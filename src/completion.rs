//! Completion provider.
//!
//! Items come from four sources, in this order: macros visible through the
//! include graph, labels of the current file, instruction mnemonics and
//! registers. Typing `%` narrows the list to registers.

use itertools::Itertools;
use ropey::Rope;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionParams, CompletionResponse,
};

use crate::cache::SymbolTable;
use crate::config::Settings;
use crate::cursor::prefix_at_position;
use crate::instructions::{self, OPCODES, REGISTERS};

pub fn get_completions(
    table: &SymbolTable,
    rope: &Rope,
    params: &CompletionParams,
    settings: &Settings,
) -> Option<CompletionResponse> {
    let prefix = prefix_at_position(rope, params.text_document_position.position);

    let items = if prefix.starts_with('%') {
        register_items().collect_vec()
    } else {
        let instruction_items = settings
            .instruction_completions
            .then(|| opcode_items().chain(register_items()))
            .into_iter()
            .flatten();

        macro_items(table)
            .chain(label_items(table))
            .chain(instruction_items)
            .collect_vec()
    };

    Some(CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items,
    }))
}

fn macro_items(table: &SymbolTable) -> impl Iterator<Item = CompletionItem> + '_ {
    table
        .macros
        .iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(name, definition)| CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::CONSTANT),
            detail: Some(format!("#define {} {}", name, definition.value).trim_end().to_string()),
            ..Default::default()
        })
}

fn label_items(table: &SymbolTable) -> impl Iterator<Item = CompletionItem> + '_ {
    table
        .labels
        .iter()
        .sorted_by_key(|(_, location)| location.line)
        .map(|(name, location)| CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::FUNCTION),
            detail: Some(format!("label, line {}", location.line + 1)),
            ..Default::default()
        })
}

fn opcode_items() -> impl Iterator<Item = CompletionItem> {
    OPCODES.iter().map(|opcode| CompletionItem {
        label: opcode.name.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        detail: Some(opcode.summary.to_string()),
        ..Default::default()
    })
}

fn register_items() -> impl Iterator<Item = CompletionItem> {
    REGISTERS.iter().map(|register| CompletionItem {
        label: register.to_string(),
        kind: Some(CompletionItemKind::VARIABLE),
        detail: Some(instructions::register_summary(register).to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MacroDefinition, SymbolLocation};
    use tower_lsp::lsp_types::{
        Position, TextDocumentIdentifier, TextDocumentPositionParams, Url,
    };

    fn params(line: u32, character: u32) -> CompletionParams {
        CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier {
                    uri: Url::parse("file:///work/main.S").unwrap(),
                },
                position: Position { line, character },
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        }
    }

    fn table() -> SymbolTable {
        let uri = Url::parse("file:///work/main.S").unwrap();
        let mut table = SymbolTable::default();
        table.macros.insert(
            "BUF_SIZE".to_string(),
            MacroDefinition {
                value: "256".to_string(),
                location: SymbolLocation::new(&uri, 0),
            },
        );
        table
            .labels
            .insert("main".to_string(), SymbolLocation::new(&uri, 3));
        table
    }

    fn items(response: CompletionResponse) -> Vec<CompletionItem> {
        match response {
            CompletionResponse::List(list) => list.items,
            CompletionResponse::Array(items) => items,
        }
    }

    #[test]
    fn test_symbols_come_first() {
        let rope = Rope::from_str("  mov $B\n");
        let response = get_completions(&table(), &rope, &params(0, 8), &Settings::default());
        let items = items(response.unwrap());

        assert_eq!(items[0].label, "BUF_SIZE");
        assert_eq!(items[0].kind, Some(CompletionItemKind::CONSTANT));
        assert_eq!(items[0].detail.as_deref(), Some("#define BUF_SIZE 256"));
        assert_eq!(items[1].label, "main");
        assert_eq!(items.len(), 2 + OPCODES.len() + REGISTERS.len());
    }

    #[test]
    fn test_percent_prefix_lists_registers_only() {
        let rope = Rope::from_str("  mov %r\n");
        let response = get_completions(&table(), &rope, &params(0, 8), &Settings::default());
        let items = items(response.unwrap());

        assert_eq!(items.len(), REGISTERS.len());
        assert!(items
            .iter()
            .all(|item| item.kind == Some(CompletionItemKind::VARIABLE)));
    }

    #[test]
    fn test_instruction_completions_disabled() {
        let rope = Rope::from_str("\n");
        let settings = Settings {
            instruction_completions: false,
            ..Settings::default()
        };
        let response = get_completions(&table(), &rope, &params(0, 0), &settings);
        let items = items(response.unwrap());

        assert_eq!(
            items.iter().map(|item| item.label.as_str()).collect_vec(),
            vec!["BUF_SIZE", "main"]
        );
    }
}
