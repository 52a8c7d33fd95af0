//! Filesystem walker
//!
//! Walks a scan root depth-first in lexical order with walkdir, prunes ignored
//! entries before descending, reads every surviving file and folds the records
//! into a [`ScanResult`]. Per-entry failures are isolated: they end up on the
//! record and in `warnings`, never as an error from [`scan_path`].

use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::core::file_reader::{read_file, ReadOptions};
use crate::core::ignore_rules::{IgnoreRuleSet, IGNORE_FILE};
use crate::core::model::{
    FileRecord, RecordError, RecordErrorKind, ScanError, ScanOptions, ScanResult,
};
use crate::core::paths::{
    file_name_string, find_repo_root, make_relative, resolve_entry_point, GIT_DIR,
};
use crate::core::tree::render_tree;

/// Scan a directory (or a single file) into a [`ScanResult`].
///
/// Fails only when the root itself cannot be resolved or walked.
pub fn scan_path(root: &Path, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    let root = resolve_entry_point(root)?;
    let metadata = fs::metadata(&root).map_err(|source| ScanError::NotFound {
        path: root.clone(),
        source,
    })?;

    let mut result = if metadata.is_dir() {
        scan_directory(&root, options)?
    } else {
        scan_single_file(&root, options)
    };

    result.directory_tree = render_tree(&result.files);
    tracing::debug!(
        "scanned {}: {} files, {} lines, {} failed entries",
        result.root_path.display(),
        result.total_files,
        result.total_lines,
        result.failed_records().count()
    );
    Ok(result)
}

fn scan_directory(root: &Path, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    let mut result = ScanResult::new(root);
    let rules = if options.skip_ignored {
        Some(load_rules(root, options, &mut result))
    } else {
        None
    };

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, rules.as_ref()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(ScanError::Walk {
                        path: root.to_path_buf(),
                        source: err,
                    });
                }
                record_access_error(root, err, &mut result);
                continue;
            }
        };

        let path = entry.path();
        let relative = make_relative(path, root).unwrap_or_else(|| file_name_string(path));

        // Symlinked directories are listed but never descended
        let is_dir = entry.file_type().is_dir() || (entry.path_is_symlink() && path.is_dir());
        if is_dir {
            result.push_record(FileRecord::directory(path, relative));
            continue;
        }

        let record = read_record(path, relative, options, &mut result);
        result.push_record(record);
    }

    Ok(result)
}

fn scan_single_file(path: &Path, options: &ScanOptions) -> ScanResult {
    let parent = path.parent().unwrap_or(path);
    let mut result = ScanResult::new(parent);
    let record = read_record(path, file_name_string(path), options, &mut result);
    result.push_record(record);
    result
}

/// Load the ignore file from the enclosing repository root, or the scan root
fn load_rules(root: &Path, options: &ScanOptions, result: &mut ScanResult) -> IgnoreRuleSet {
    let base = find_repo_root(root).unwrap_or_else(|| root.to_path_buf());
    tracing::debug!("loading ignore rules from {}", base.display());

    let (rules, warning) = IgnoreRuleSet::load(&base, options.ignore_grammar);
    if let Some(warning) = warning {
        tracing::debug!("{}", warning);
        result.push_warning(warning);
    }
    tracing::debug!(
        "{} ignore patterns relative to {}",
        rules.patterns().len(),
        rules.base_path().display()
    );
    rules
}

fn is_excluded(entry: &DirEntry, rules: Option<&IgnoreRuleSet>) -> bool {
    let Some(rules) = rules else {
        return false;
    };

    let is_dir = entry.file_type().is_dir();
    let name = entry.file_name();
    if (is_dir && name == GIT_DIR) || (!is_dir && name == IGNORE_FILE) {
        return true;
    }

    let ignored = rules.is_ignored_path(entry.path(), is_dir);
    if ignored {
        tracing::debug!("ignored {}", entry.path().display());
    }
    ignored
}

fn read_record(
    path: &Path,
    relative: String,
    options: &ScanOptions,
    result: &mut ScanResult,
) -> FileRecord {
    let read_options = ReadOptions {
        line_numbers: options.annotate_line_numbers,
        max_file_size: options.max_file_size,
    };
    let record = FileRecord::file(path, relative);

    match read_file(path, &read_options) {
        Ok(content) => FileRecord {
            content: content.text,
            line_count: content.line_count,
            size: content.size,
            modified_at: content.modified_at,
            is_binary: content.is_binary,
            truncated: content.truncated,
            ..record
        },
        Err(err) => {
            let message = format!("error reading {}: {}", path.display(), err);
            tracing::warn!("{}", message);
            result.push_warning(message.clone());
            record.with_error(RecordError::new(RecordErrorKind::Read, message))
        }
    }
}

fn record_access_error(root: &Path, err: walkdir::Error, result: &mut ScanResult) {
    let message = match err.path() {
        Some(path) => format!("error accessing {}: {}", path.display(), err),
        None => format!("error accessing entry: {}", err),
    };
    tracing::warn!("{}", message);
    result.push_warning(message.clone());

    let Some(path) = err.path() else {
        return;
    };
    let access = RecordError::new(RecordErrorKind::Access, message);

    // A directory that cannot be listed was already recorded when it was entered
    if let Some(existing) = result
        .files
        .iter_mut()
        .rev()
        .find(|f| f.is_dir && f.path.as_path() == path)
    {
        existing.error = Some(access);
        return;
    }

    let relative = make_relative(path, root).unwrap_or_else(|| file_name_string(path));
    result.push_record(FileRecord::file(path, relative).with_error(access));
}
