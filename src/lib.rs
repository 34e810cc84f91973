//! gas-macro-lsp: a Language Server for GNU assembler with C preprocessor macros
//!
//! This crate provides editor intelligence for `.S`/`.s` assembly sources that
//! use `#define` and `#include`: hover, completion, go-to-definition, semantic
//! highlighting and symbol search.
//!
//! # Architecture
//!
//! - [`cache`]: the symbol cache. Scans each document for macros, labels and
//!   includes, resolves includes against the configured search paths, and
//!   merges macros across the include graph on lookup.
//! - [`backend`]: the `tower_lsp` server that feeds editor events into the
//!   cache and answers requests.
//! - [`hover`], [`completion`], [`gotodef`], [`tokens`], [`symbol`]: request
//!   handlers, each a function of a merged symbol table.
//! - [`config`]: layered settings (defaults, settings files, client values).
//!
//! ```ignore
//! use gas_macro_lsp::cache::SymbolCache;
//!
//! let mut cache = SymbolCache::new();
//! cache.set_include_paths(["/usr/include"]);
//! cache.update(&uri, "#include <asm/unistd.h>\n");
//! let table = cache.get(&uri);
//! ```

// Core module - symbol indexing and caching
pub mod cache;

// LSP feature modules
pub mod backend;
pub mod completion;
pub mod gotodef;
pub mod hover;
pub mod symbol;
pub mod tokens;

// Configuration and static data
pub mod config;
pub mod cursor;
pub mod instructions;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
