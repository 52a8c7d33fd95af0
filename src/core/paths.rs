//! Path normalization utilities
//!
//! Ensures all relative paths use '/' as separator and resolves user input to
//! an absolute, existing entry point.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::model::ScanError;

/// Directory holding git metadata
pub const GIT_DIR: &str = ".git";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Resolve a user-supplied path against the working directory and check that it exists.
///
/// An empty path resolves to the working directory itself.
pub fn resolve_entry_point(path: &Path) -> Result<PathBuf, ScanError> {
    let absolute = if path.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(path)
    }
    .map_err(|source| ScanError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    fs::metadata(&absolute).map_err(|source| ScanError::NotFound {
        path: absolute.clone(),
        source,
    })?;

    Ok(absolute)
}

/// Find the nearest ancestor (including `start` itself) that holds a `.git` entry
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GIT_DIR).exists())
        .map(Path::to_path_buf)
}

/// File name of a path as an owned string, empty when there is none
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Ensure the parent directory of `path` exists
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
