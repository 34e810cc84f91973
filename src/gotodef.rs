use ropey::Rope;
use tower_lsp::lsp_types::{Location, Position};

use crate::cache::SymbolTable;
use crate::cursor::word_at_position;

/// Jump from a macro or label under the cursor to its defining line.
///
/// Macros resolve through the merged table, so a macro from an included
/// header lands in that header. Labels only resolve within the current file.
pub fn goto_definition(
    table: &SymbolTable,
    rope: &Rope,
    cursor_position: Position,
) -> Option<Vec<Location>> {
    let word = word_at_position(rope, cursor_position)?;

    let location = table
        .macros
        .get(&word.text)
        .map(|definition| &definition.location)
        .or_else(|| table.labels.get(&word.text))?;

    Some(vec![location.to_lsp_location()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SymbolCache;
    use crate::test_utils::{create_test_workspace, write_source};
    use tower_lsp::lsp_types::Url;

    /// Test: a macro defined in an included header resolves into the header.
    #[test]
    fn test_goto_definition_macro_in_include() {
        let (_temp_dir, root) = create_test_workspace();
        let header = write_source(&root.join("sys.h"), "\n\n#define SYS_WRITE 1\n");
        let main = Url::from_file_path(root.join("main.S")).unwrap();
        let text = "#include \"sys.h\"\n  mov $SYS_WRITE, %eax\n";

        let mut cache = SymbolCache::new();
        cache.update(&main, text);
        let table = cache.get(&main);

        let locations = goto_definition(
            &table,
            &Rope::from_str(text),
            Position {
                line: 1,
                character: 10,
            },
        )
        .unwrap();

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri, header);
        assert_eq!(locations[0].range.start.line, 2);
    }

    /// Test: a local label resolves to its line in the same file.
    #[test]
    fn test_goto_definition_label() {
        let (_temp_dir, root) = create_test_workspace();
        let main = Url::from_file_path(root.join("main.S")).unwrap();
        let text = "_start:\n  nop\n  jmp _start\n";

        let mut cache = SymbolCache::new();
        cache.update(&main, text);
        let table = cache.get(&main);

        let locations = goto_definition(
            &table,
            &Rope::from_str(text),
            Position {
                line: 2,
                character: 8,
            },
        )
        .unwrap();

        assert_eq!(locations[0].uri, main);
        assert_eq!(locations[0].range.start.line, 0);
    }

    /// Test: instructions and unknown words have no definition.
    #[test]
    fn test_goto_definition_none() {
        let text = "  nop\n";
        let result = goto_definition(
            &SymbolTable::default(),
            &Rope::from_str(text),
            Position {
                line: 0,
                character: 3,
            },
        );

        assert!(result.is_none());
    }
}
