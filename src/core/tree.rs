//! Directory tree rendering
//!
//! Turns the flat record list into an indented hierarchy:
//!
//! ```text
//! src/
//!   main.rs (120 tokens)
//!   utils/
//!     helper.rs
//! README.md
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::core::model::FileRecord;

const INDENT: &str = "  ";

/// What the tree needs to know about one distinct relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry {
    pub is_dir: bool,
    pub token_count: usize,
}

/// Map every distinct non-root relative path to its entry, sorted by path.
///
/// Later records win when a path appears twice.
pub fn build_path_map(files: &[FileRecord]) -> BTreeMap<&str, TreeEntry> {
    files
        .iter()
        .filter(|record| !record.relative_path.is_empty())
        .map(|record| {
            (
                record.relative_path.as_str(),
                TreeEntry {
                    is_dir: record.is_dir,
                    token_count: record.token_count,
                },
            )
        })
        .collect()
}

/// Render the records as an indented tree, one newline-terminated line per entry.
///
/// Pure and deterministic: the output depends only on the set of paths, their
/// directory flags and token counts, never on record order.
pub fn render_tree(files: &[FileRecord]) -> String {
    let path_map = build_path_map(files);
    let mut output = String::new();
    let mut emitted: HashSet<String> = HashSet::new();

    for (path, entry) in &path_map {
        let parts: Vec<&str> = path.split('/').collect();
        let last = parts.len() - 1;

        for depth in 0..parts.len() {
            let prefix = parts[..=depth].join("/");
            if !emitted.insert(prefix) {
                continue;
            }

            output.push_str(&INDENT.repeat(depth));
            output.push_str(parts[depth]);

            if depth < last || entry.is_dir {
                output.push('/');
            } else if entry.token_count > 0 {
                output.push_str(&format!(" ({} tokens)", entry.token_count));
            }
            output.push('\n');
        }
    }

    output
}
