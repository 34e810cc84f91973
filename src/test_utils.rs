//! Shared test utilities for gas-macro-lsp.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

/// Creates a temporary workspace directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the workspace subdirectory
///
/// # Example
///
/// ```ignore
/// use crate::test_utils::create_test_workspace;
///
/// let (_temp_dir, root) = create_test_workspace();
/// std::fs::write(root.join("defs.h"), "#define X 1").unwrap();
/// ```
pub fn create_test_workspace() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("workspace");
    fs::create_dir(&root).expect("Failed to create workspace subdirectory");
    (temp_dir, root)
}

/// Writes `text` to `path` and returns the file URI for it.
pub fn write_source(path: &Path, text: &str) -> Url {
    fs::write(path, text).expect("Failed to write test source");
    Url::from_file_path(path).expect("Test paths are absolute")
}
