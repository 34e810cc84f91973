//! Finding the token under the editor cursor.

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::Position;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"%?[A-Za-z0-9_.]+").unwrap());

/// A word on a single line. `start` and `end` are UTF-16 columns, the
/// default LSP position encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub start: u32,
    pub end: u32,
}

/// The word containing `position`. A cursor just past the last character
/// still counts as on the word.
pub fn word_at_position(rope: &Rope, position: Position) -> Option<Word> {
    let line = rope.get_line(position.line as usize)?.to_string();
    let cursor = position.character as usize;

    WORD_RE.find_iter(&line).find_map(|found| {
        let start = line[..found.start()].encode_utf16().count();
        let end = start + found.as_str().encode_utf16().count();

        (start..=end).contains(&cursor).then(|| Word {
            text: found.as_str().to_string(),
            start: start as u32,
            end: end as u32,
        })
    })
}

/// The part of the word under the cursor that precedes it, used as the
/// completion prefix. Empty when the cursor is not on a word.
pub fn prefix_at_position(rope: &Rope, position: Position) -> String {
    word_at_position(rope, position)
        .map(|word| {
            word.text
                .chars()
                .take((position.character - word.start) as usize)
                .collect()
        })
        .unwrap_or_default()
}
