//! Token annotation pass
//!
//! Runs after a scan: counts tokens for every readable, non-empty file, sets
//! `total_tokens` and re-renders the tree so it carries the per-file counts.

use crate::core::model::{ScanError, ScanResult};
use crate::core::tokenizer::{TokenCounter, TokenModel, Tokenizer};
use crate::core::tree::render_tree;

/// Annotate `scan` with token counts from `tokenizer`.
///
/// A failure on one file leaves its count at zero and adds a warning.
pub fn annotate(mut scan: ScanResult, tokenizer: &dyn Tokenizer) -> ScanResult {
    let mut total = 0usize;
    let mut warnings = Vec::new();

    for record in scan.files.iter_mut() {
        if !record.is_countable() || record.content.is_empty() {
            continue;
        }

        match tokenizer.count(&record.content) {
            Ok(count) => {
                record.token_count = count;
                total += count;
            }
            Err(e) => {
                let message = format!("error counting tokens for {}: {}", record.relative_path, e);
                tracing::warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    scan.total_tokens = total;
    scan.warnings.extend(warnings);
    scan.directory_tree = render_tree(&scan.files);
    tracing::debug!("annotated {} tokens", total);
    scan
}

/// Load the encoding for `model`, then annotate.
///
/// Fails before touching any record if the encoding cannot be loaded.
pub fn annotate_with_model(scan: ScanResult, model: TokenModel) -> Result<ScanResult, ScanError> {
    let counter = TokenCounter::new(model)?;
    tracing::debug!("counting tokens with {}", counter.model());
    Ok(annotate(scan, &counter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::scan::scan_path;
    use crate::core::model::{FileRecord, RecordError, RecordErrorKind, ScanOptions};
    use crate::core::tokenizer::TokenizeError;
    use std::fs;
    use tempfile::tempdir;

    struct ByteCounter;

    impl Tokenizer for ByteCounter {
        fn count(&self, text: &str) -> Result<usize, TokenizeError> {
            Ok(text.len())
        }
    }

    struct Zero;

    impl Tokenizer for Zero {
        fn count(&self, _text: &str) -> Result<usize, TokenizeError> {
            Ok(0)
        }
    }

    struct Picky;

    impl Tokenizer for Picky {
        fn count(&self, text: &str) -> Result<usize, TokenizeError> {
            if text.contains("bad") {
                Err(TokenizeError("unsupported input".to_string()))
            } else {
                Ok(1)
            }
        }
    }

    fn text_file(rel: &str, content: &str) -> FileRecord {
        let mut record = FileRecord::file(format!("/root/{}", rel), rel);
        record.content = content.to_string();
        record.line_count = content.lines().count();
        record
    }

    fn scan_of(records: Vec<FileRecord>) -> ScanResult {
        let mut scan = ScanResult::new("/root");
        for record in records {
            scan.push_record(record);
        }
        scan.directory_tree = render_tree(&scan.files);
        scan
    }

    #[test]
    fn test_annotate_counts_and_rerenders_tree() {
        let scan = scan_of(vec![FileRecord::directory("/root", ""), text_file("a.txt", "hi\n")]);

        let scan = annotate(scan, &ByteCounter);

        assert_eq!(scan.total_tokens, 3);
        assert_eq!(scan.files[1].token_count, 3);
        assert_eq!(scan.directory_tree, "a.txt (3 tokens)\n");
    }

    #[test]
    fn test_annotate_skips_dirs_errors_and_empty_files() {
        let failed = text_file("broken.txt", "data\n")
            .with_error(RecordError::new(RecordErrorKind::Read, "denied"));
        let scan = scan_of(vec![
            FileRecord::directory("/root/src", "src"),
            text_file("src/lib.rs", "pub fn x() {}\n"),
            text_file("empty.txt", ""),
            failed,
        ]);

        let scan = annotate(scan, &ByteCounter);

        let counts: Vec<usize> = scan.files.iter().map(|f| f.token_count).collect();
        assert_eq!(counts, vec![0, 14, 0, 0]);
        assert_eq!(scan.total_tokens, 14);
    }

    #[test]
    fn test_per_file_failure_is_not_fatal() {
        let scan = scan_of(vec![text_file("good.txt", "fine\n"), text_file("bad.txt", "bad\n")]);

        let scan = annotate(scan, &Picky);

        assert_eq!(scan.total_tokens, 1);
        assert_eq!(scan.files[1].token_count, 0);
        assert_eq!(scan.warnings.len(), 1);
        assert!(scan.warnings[0].contains("bad.txt"));
    }

    #[test]
    fn test_total_equals_sum_of_counts() {
        let scan = scan_of(vec![
            text_file("a.txt", "one\n"),
            text_file("b/c.txt", "two words\n"),
        ]);

        let scan = annotate_with_model(scan, TokenModel::Heuristic).unwrap();

        let sum: usize = scan.files.iter().map(|f| f.token_count).sum();
        assert_eq!(scan.total_tokens, sum);
        assert!(sum > 0);
    }

    fn scanned_dir() -> (tempfile::TempDir, ScanResult) {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "hi\n").unwrap();
        fs::write(temp.path().join(".gitignore"), "b.txt\n").unwrap();
        fs::write(temp.path().join("b.txt"), "x\n").unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/lib.rs"), "pub fn x() {}\n").unwrap();

        let scan = scan_path(temp.path(), &ScanOptions::default()).unwrap();
        (temp, scan)
    }

    #[test]
    fn test_zero_count_pass_leaves_tree_unchanged() {
        let (_temp, scan) = scanned_dir();
        let before = scan.directory_tree.clone();

        let scan = annotate(scan, &Zero);

        assert_eq!(scan.directory_tree, before);
        assert_eq!(scan.total_tokens, 0);
        assert!(scan.files.iter().all(|f| f.token_count == 0));
    }

    #[test]
    fn test_annotate_after_real_scan() {
        let (_temp, scan) = scanned_dir();
        assert_eq!(scan.directory_tree, "a.txt\nsrc/\n  lib.rs\n");

        let scan = annotate(scan, &ByteCounter);

        assert_eq!(scan.total_tokens, 3 + 14);
        assert_eq!(
            scan.directory_tree,
            "a.txt (3 tokens)\nsrc/\n  lib.rs (14 tokens)\n"
        );
        assert!(scan
            .files
            .iter()
            .filter(|f| f.is_dir)
            .all(|f| f.token_count == 0));
    }
}
