//! Include path resolution.
//!
//! An include filename is looked up next to the including file first and then
//! in each configured search directory, in order. The first candidate that
//! exists on disk wins. A filename found nowhere is not an error; the caller
//! just records no dependency for it.

use std::path::{Component, Path, PathBuf};

/// Resolve `filename` to an existing file.
///
/// `including_dir` is `None` when the including document has no filesystem
/// path (for example an unsaved buffer); only the search directories are
/// consulted then.
pub fn resolve(
    filename: &str,
    including_dir: Option<&Path>,
    search_dirs: &[PathBuf],
) -> Option<PathBuf> {
    including_dir
        .into_iter()
        .chain(search_dirs.iter().map(PathBuf::as_path))
        .map(|dir| absolutize(&dir.join(filename)))
        .find(|candidate| candidate.is_file())
}

/// Make `path` absolute and fold `.` and `..` components without touching
/// the filesystem, so that the same file reached through different includes
/// gets the same identity.
pub fn absolutize(path: &Path) -> PathBuf {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
