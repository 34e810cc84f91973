//! Semantic highlighting.
//!
//! A single lexical pass per line classifies identifiers against the merged
//! symbol table and the static instruction tables. Nothing here parses
//! operands; an identifier that is not a known symbol is left to the
//! client's grammar.

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::{
    SemanticToken, SemanticTokenType, SemanticTokens, SemanticTokensLegend,
    SemanticTokensResult,
};

use crate::cache::SymbolTable;
use crate::instructions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TokenKind {
    Macro = 0,
    Label = 1,
    Instruction = 2,
    Register = 3,
    Number = 4,
    Comment = 5,
}

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::MACRO,
            SemanticTokenType::FUNCTION,
            SemanticTokenType::KEYWORD,
            SemanticTokenType::VARIABLE,
            SemanticTokenType::NUMBER,
            SemanticTokenType::COMMENT,
        ],
        token_modifiers: vec![],
    }
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?<word>%?[A-Za-z_.][A-Za-z0-9_.]*)|(?<number>\$?(?:0[xX][0-9A-Fa-f]+|[0-9]+))")
        .unwrap()
});

/// A classified token. `start` and `length` are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineToken {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub kind: TokenKind,
}

/// Classify every recognizable token of the document, in document order.
pub fn classify(table: &SymbolTable, rope: &Rope) -> Vec<LineToken> {
    let mut tokens = Vec::new();

    for (line_number, line) in rope.lines().enumerate() {
        let line = line.to_string();
        let line = line.trim_end_matches(['\n', '\r']);
        let (code, comment) = match line.find("//") {
            Some(idx) => (&line[..idx], Some(idx)),
            None => (line, None),
        };

        for captures in TOKEN_RE.captures_iter(code) {
            let (found, kind) = match (captures.name("word"), captures.name("number")) {
                (Some(word), _) => match classify_word(table, word.as_str()) {
                    Some(kind) => (word, kind),
                    None => continue,
                },
                (None, Some(number)) => (number, TokenKind::Number),
                (None, None) => continue,
            };

            tokens.push(LineToken {
                line: line_number as u32,
                start: code[..found.start()].encode_utf16().count() as u32,
                length: found.as_str().encode_utf16().count() as u32,
                kind,
            });
        }

        if let Some(idx) = comment {
            tokens.push(LineToken {
                line: line_number as u32,
                start: line[..idx].encode_utf16().count() as u32,
                length: line[idx..].encode_utf16().count() as u32,
                kind: TokenKind::Comment,
            });
        }
    }

    tokens
}

fn classify_word(table: &SymbolTable, word: &str) -> Option<TokenKind> {
    if word.starts_with('%') {
        return instructions::register(word).map(|_| TokenKind::Register);
    }

    if table.macros.contains_key(word) {
        Some(TokenKind::Macro)
    } else if table.labels.contains_key(word) {
        Some(TokenKind::Label)
    } else if instructions::opcode(word).is_some() {
        Some(TokenKind::Instruction)
    } else {
        None
    }
}

/// `textDocument/semanticTokens/full` response with LSP delta encoding.
pub fn semantic_tokens_full(table: &SymbolTable, rope: &Rope) -> SemanticTokensResult {
    let mut previous_line = 0;
    let mut previous_start = 0;

    let data = classify(table, rope)
        .into_iter()
        .map(|token| {
            let delta_line = token.line - previous_line;
            let delta_start = if delta_line == 0 {
                token.start - previous_start
            } else {
                token.start
            };
            previous_line = token.line;
            previous_start = token.start;

            SemanticToken {
                delta_line,
                delta_start,
                length: token.length,
                token_type: token.kind as u32,
                token_modifiers_bitset: 0,
            }
        })
        .collect();

    SemanticTokensResult::Tokens(SemanticTokens {
        result_id: None,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::scan;
    use tower_lsp::lsp_types::Url;

    fn table_for(text: &str) -> SymbolTable {
        scan(text, &Url::parse("file:///work/main.S").unwrap())
    }

    #[test]
    fn test_classify_line() {
        let text = "#define LEN 4\nloop:\n  movl $LEN, %eax // count\n  jmp loop\n";
        let tokens = classify(&table_for(text), &Rope::from_str(text));

        let on_line = |line: u32| {
            tokens
                .iter()
                .filter(|token| token.line == line)
                .map(|token| (token.start, token.length, token.kind))
                .collect::<Vec<_>>()
        };

        assert_eq!(
            on_line(0),
            vec![(8, 3, TokenKind::Macro), (12, 1, TokenKind::Number)]
        );
        assert_eq!(on_line(1), vec![(0, 4, TokenKind::Label)]);
        assert_eq!(
            on_line(2),
            vec![
                (2, 4, TokenKind::Instruction),
                (8, 3, TokenKind::Macro),
                (13, 4, TokenKind::Register),
                (18, 8, TokenKind::Comment),
            ]
        );
        assert_eq!(
            on_line(3),
            vec![(2, 3, TokenKind::Instruction), (6, 4, TokenKind::Label)]
        );
    }

    #[test]
    fn test_unknown_words_are_skipped() {
        let text = "  frob %xmm0, 0x10\n";
        let tokens = classify(&SymbolTable::default(), &Rope::from_str(text));

        assert_eq!(
            tokens,
            vec![LineToken {
                line: 0,
                start: 14,
                length: 4,
                kind: TokenKind::Number,
            }]
        );
    }

    #[test]
    fn test_columns_after_astral_character() {
        let text = "/* \u{1F600} */ nop // \u{1F600}\n";
        let tokens = classify(&SymbolTable::default(), &Rope::from_str(text));

        assert_eq!(
            tokens
                .iter()
                .map(|token| (token.start, token.length, token.kind))
                .collect::<Vec<_>>(),
            vec![(9, 3, TokenKind::Instruction), (13, 5, TokenKind::Comment)]
        );
    }

    #[test]
    fn test_delta_encoding() {
        let text = "nop\n\n  nop nop\n";
        let SemanticTokensResult::Tokens(tokens) =
            semantic_tokens_full(&SymbolTable::default(), &Rope::from_str(text))
        else {
            panic!("expected full tokens");
        };

        let deltas = tokens
            .data
            .iter()
            .map(|token| (token.delta_line, token.delta_start, token.length))
            .collect::<Vec<_>>();

        assert_eq!(deltas, vec![(0, 0, 3), (2, 2, 3), (0, 4, 3)]);
    }

    #[test]
    fn test_legend_matches_kinds() {
        let legend = legend();
        assert_eq!(
            legend.token_types[TokenKind::Register as usize],
            SemanticTokenType::VARIABLE
        );
        assert_eq!(
            legend.token_types[TokenKind::Comment as usize],
            SemanticTokenType::COMMENT
        );
    }
}
