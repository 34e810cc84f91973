//! Symbol providers.
//!
//! This module implements LSP symbol capabilities:
//! - `textDocument/documentSymbol` - outline of the current file
//! - `workspace/symbol` - fuzzy search across every cached document
//!
//! | Symbol Type | LSP Kind |
//! |-------------|----------|
//! | Macros | `Constant` |
//! | Labels, externs, sections | `Function` |
//!
//! Only symbols defined in the file itself are listed in its outline, even
//! though hover and completion also see macros from included headers.

use itertools::Itertools;
use nucleo_matcher::{
    pattern::{self, Normalization},
    Matcher,
};
use tower_lsp::lsp_types::{
    DocumentSymbol, DocumentSymbolResponse, Location, SymbolInformation, SymbolKind, Url,
    WorkspaceSymbolParams,
};

use crate::cache::{SymbolCache, SymbolTable};

fn compute_match_score(
    matcher: &mut Matcher,
    pattern: &pattern::Pattern,
    symbol: SymbolInformation,
) -> (u32, SymbolInformation) {
    let mut buf = Vec::new();
    (
        pattern
            .score(
                nucleo_matcher::Utf32Str::new(symbol.name.as_str(), &mut buf),
                matcher,
            )
            .unwrap_or_default(),
        symbol,
    )
}

/// Search macros and labels of every cached document.
///
/// Returns matches sorted by fuzzy match score, best first.
pub fn workspace_symbol(
    cache: &SymbolCache,
    params: &WorkspaceSymbolParams,
) -> Option<Vec<SymbolInformation>> {
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let pattern = pattern::Pattern::parse(
        &params.query,
        pattern::CaseMatching::Smart,
        Normalization::Smart,
    );

    Some(
        cache
            .entries()
            .flat_map(|(_, entry)| own_symbols(&entry.table))
            .map(symbol_information)
            .map(|symbol| compute_match_score(&mut matcher, &pattern, symbol))
            .filter(|(score, _)| *score > 0)
            .sorted_by(|(a, _), (b, _)| Ord::cmp(b, a))
            .map(|(_score, symbol)| symbol)
            .collect_vec(),
    )
}

/// Outline of a single document, sorted by line.
///
/// `table` is filtered to symbols whose location is `uri`, so a merged table
/// can be passed directly. Returns `None` when the file defines nothing.
pub fn document_symbol(table: &SymbolTable, uri: &Url) -> Option<DocumentSymbolResponse> {
    let symbols = own_symbols(table)
        .into_iter()
        .filter(|symbol| &symbol.location.uri == uri)
        .sorted_by(|a, b| {
            (a.location.range.start.line, &a.name).cmp(&(b.location.range.start.line, &b.name))
        })
        .collect_vec();

    if symbols.is_empty() {
        return None;
    }

    Some(DocumentSymbolResponse::Nested(to_document_symbols(symbols)))
}

/// Internal representation of a symbol before it is shaped for a response.
#[derive(Debug)]
struct FlatSymbol {
    name: String,
    kind: SymbolKind,
    detail: Option<String>,
    location: Location,
}

fn own_symbols(table: &SymbolTable) -> Vec<FlatSymbol> {
    let macros = table.macros.iter().map(|(name, definition)| FlatSymbol {
        name: name.clone(),
        kind: SymbolKind::CONSTANT,
        detail: Some(definition.value.clone()).filter(|value| !value.is_empty()),
        location: definition.location.to_lsp_location(),
    });

    let labels = table.labels.iter().map(|(name, location)| FlatSymbol {
        name: name.clone(),
        kind: SymbolKind::FUNCTION,
        detail: None,
        location: location.to_lsp_location(),
    });

    macros.chain(labels).collect()
}

#[allow(deprecated)] // field deprecated has been deprecated in favor of using tags
fn symbol_information(symbol: FlatSymbol) -> SymbolInformation {
    SymbolInformation {
        name: symbol.name,
        kind: symbol.kind,
        tags: None,
        deprecated: None,
        location: symbol.location,
        container_name: None,
    }
}

#[allow(deprecated)] // field deprecated has been deprecated in favor of using tags
fn to_document_symbols(symbols: Vec<FlatSymbol>) -> Vec<DocumentSymbol> {
    symbols
        .into_iter()
        .map(|symbol| DocumentSymbol {
            name: symbol.name,
            kind: symbol.kind,
            range: symbol.location.range,
            selection_range: symbol.location.range,
            detail: symbol.detail,
            deprecated: None,
            tags: None,
            children: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_workspace, write_source};

    fn names(response: DocumentSymbolResponse) -> Vec<(String, SymbolKind)> {
        match response {
            DocumentSymbolResponse::Nested(symbols) => {
                symbols.into_iter().map(|s| (s.name, s.kind)).collect()
            }
            DocumentSymbolResponse::Flat(symbols) => {
                symbols.into_iter().map(|s| (s.name, s.kind)).collect()
            }
        }
    }

    #[test]
    fn test_document_symbols_in_line_order() {
        let (_temp_dir, root) = create_test_workspace();
        write_source(&root.join("defs.h"), "#define FROM_HEADER 1\n");
        let main = Url::from_file_path(root.join("main.S")).unwrap();

        let mut cache = SymbolCache::new();
        cache.update(
            &main,
            "#include \"defs.h\"\n.section .text\n#define SIZE 8\n_start:\n",
        );
        let table = cache.get(&main);

        let response = document_symbol(&table, &main).unwrap();
        assert_eq!(
            names(response),
            vec![
                (".text".to_string(), SymbolKind::FUNCTION),
                ("SIZE".to_string(), SymbolKind::CONSTANT),
                ("_start".to_string(), SymbolKind::FUNCTION),
            ]
        );
    }

    #[test]
    fn test_document_symbols_empty_file() {
        let uri = Url::parse("file:///work/empty.S").unwrap();
        assert!(document_symbol(&SymbolTable::default(), &uri).is_none());
    }

    #[test]
    fn test_workspace_symbol_fuzzy_match() {
        let (_temp_dir, root) = create_test_workspace();
        let a = Url::from_file_path(root.join("a.S")).unwrap();
        let b = Url::from_file_path(root.join("b.S")).unwrap();

        let mut cache = SymbolCache::new();
        cache.update(&a, "#define BUFFER_SIZE 64\nprint_buffer:\n");
        cache.update(&b, "#define UNRELATED 1\n");

        let params = WorkspaceSymbolParams {
            query: "bufsize".to_string(),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
        };
        let symbols = workspace_symbol(&cache, &params).unwrap();

        assert_eq!(symbols[0].name, "BUFFER_SIZE");
        assert_eq!(symbols[0].location.uri, a);
        assert!(symbols.iter().all(|symbol| symbol.name != "UNRELATED"));
    }
}
