//! The symbol cache: per-document symbol tables and their include graph.
//!
//! Each document identity maps to a [`CacheEntry`] holding the symbols found
//! in that document's own text and the include targets that resolved to files
//! on disk. Lookups through [`SymbolCache::get`] merge macros across the
//! include graph on demand, so a lookup always reflects the current state of
//! every entry it touches.
//!
//! # Lifecycle
//!
//! | Event | Operation |
//! |-------|-----------|
//! | buffer opened or edited | [`SymbolCache::update`] |
//! | file changed or deleted on disk | [`SymbolCache::delete`] |
//! | include search paths changed | [`SymbolCache::set_include_paths`] then [`SymbolCache::clear`] |
//!
//! Documents that were never opened are read from disk the first time a
//! lookup reaches them.
//!
//! # Merge order
//!
//! The root document's macros are seeded first; each dependency's merged
//! macros are then layered on top in include order, so an include can shadow
//! a macro of the file that includes it. Labels are only ever taken from the
//! root document.

mod resolver;
mod scanner;
mod types;


pub use resolver::{absolutize, resolve};
pub use scanner::{scan, scan_includes, scan_labels, scan_macros};
pub use types::{CacheEntry, MacroDefinition, SymbolLocation, SymbolTable};

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

/// Owned, explicitly constructed symbol cache. One per server session.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: HashMap<Url, CacheEntry>,
    include_paths: Vec<PathBuf>,
}

impl SymbolCache {
    pub fn new() -> SymbolCache {
        SymbolCache::default()
    }

    /// Replace the search directories used by later updates.
    ///
    /// Existing entries keep the dependencies they were resolved with; call
    /// [`SymbolCache::clear`] to discard them.
    pub fn set_include_paths<P: Into<PathBuf>>(&mut self, paths: impl IntoIterator<Item = P>) {
        self.include_paths = paths.into_iter().map(Into::into).collect();
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn clear(&mut self) {
        debug!("clearing {} cache entries", self.entries.len());
        self.entries.clear();
    }

    pub fn delete(&mut self, uri: &Url) {
        if self.entries.remove(uri).is_some() {
            debug!("dropped cache entry for {uri}");
        }
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Url) -> bool) {
        self.entries.retain(|uri, _| keep(uri));
    }

    pub fn has(&self, uri: &Url) -> bool {
        self.entries.contains_key(uri)
    }

    /// The stored entry for `uri`, without loading or merging.
    pub fn entry(&self, uri: &Url) -> Option<&CacheEntry> {
        self.entries.get(uri)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Url, &CacheEntry)> {
        self.entries.iter()
    }

    /// Scan `text` and store it as the entry for `uri`, replacing any
    /// previous entry wholesale.
    pub fn update(&mut self, uri: &Url, text: &str) {
        let table = scan(text, uri);

        let including_dir = uri
            .to_file_path()
            .ok()
            .and_then(|path| path.parent().map(PathBuf::from));

        let dependencies: Vec<Url> = scan_includes(text)
            .iter()
            .filter_map(|filename| {
                resolve(filename, including_dir.as_deref(), &self.include_paths)
            })
            .filter_map(|path| Url::from_file_path(path).ok())
            .collect();

        debug!(
            "cached {uri}: {} macros, {} labels, {} includes",
            table.macros.len(),
            table.labels.len(),
            dependencies.len()
        );

        self.entries.insert(
            uri.clone(),
            CacheEntry {
                table,
                dependencies,
            },
        );
    }

    /// The symbols visible from `uri`: its own macros and labels plus the
    /// macros of everything it includes, transitively.
    ///
    /// A missing entry is loaded from disk first. A document that cannot be
    /// read yields an empty table and is not cached.
    pub fn get(&mut self, uri: &Url) -> SymbolTable {
        let mut path = HashSet::new();
        self.get_visiting(uri, &mut path)
    }

    /// `path` holds the identities on the current recursion path; it is
    /// restored before returning.
    fn get_visiting(&mut self, uri: &Url, path: &mut HashSet<Url>) -> SymbolTable {
        if path.contains(uri) {
            return SymbolTable::default();
        }

        if !self.has(uri) && !self.load(uri) {
            return SymbolTable::default();
        }

        let Some(entry) = self.entries.get(uri) else {
            return SymbolTable::default();
        };

        let mut merged = entry.table.clone();
        let dependencies = entry.dependencies.clone();

        path.insert(uri.clone());
        for dependency in &dependencies {
            let included = self.get_visiting(dependency, path);
            merged.macros.extend(included.macros);
        }
        path.remove(uri);

        merged
    }

    /// Read the backing file of `uri` and cache it. Returns whether an entry
    /// was created.
    fn load(&mut self, uri: &Url) -> bool {
        let Ok(file_path) = uri.to_file_path() else {
            return false;
        };
        if !file_path.is_file() {
            return false;
        }

        // Headers in legacy encodings are still indexed; only the bytes that
        // are not UTF-8 are replaced.
        match std::fs::read(&file_path) {
            Ok(bytes) => {
                self.update(uri, &String::from_utf8_lossy(&bytes));
                true
            }
            Err(err) => {
                warn!("failed to read {}: {err}", file_path.display());
                false
            }
        }
    }
}
