//! File content acquisition
//!
//! Reads one file through a single scoped handle:
//! - sniffs the first bytes for binary content
//! - scans line by line, optionally prefixing 1-based line numbers
//! - converts invalid UTF-8 lossily
//! - keeps only a short preview of files over the optional size limit

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Bytes inspected for binary detection
pub const BINARY_SNIFF_LEN: usize = 512;

/// Lines kept from a file over the size limit
pub const PREVIEW_LINES: usize = 50;

/// Appended to the content of truncated files
pub const TRUNCATION_NOTICE: &str = "\n\n[File truncated - too large to display completely]";

/// Configuration for reading a single file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Prefix every line with "N\t"
    pub line_numbers: bool,

    /// Files larger than this (bytes) keep only the first `PREVIEW_LINES` lines
    pub max_file_size: Option<u64>,
}

/// Result of reading a file
#[derive(Debug, Clone, Default)]
pub struct FileContent {
    /// Accumulated text, every line newline-terminated
    pub text: String,

    /// Number of lines scanned into `text`
    pub line_count: usize,

    /// Size on disk in bytes
    pub size: u64,

    pub modified_at: Option<DateTime<Local>>,

    /// Binary files carry no text
    pub is_binary: bool,

    pub truncated: bool,
}

/// Read a file with the given options.
///
/// The handle is opened once and dropped on every exit path.
pub fn read_file(path: &Path, options: &ReadOptions) -> io::Result<FileContent> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let size = metadata.len();
    let modified_at = metadata.modified().ok().map(DateTime::<Local>::from);

    let mut reader = BufReader::new(file);
    let head = reader.fill_buf()?;
    let sniff = &head[..head.len().min(BINARY_SNIFF_LEN)];
    if is_binary(sniff) {
        return Ok(FileContent {
            size,
            modified_at,
            is_binary: true,
            ..Default::default()
        });
    }

    let preview_only = options.max_file_size.is_some_and(|max| size > max);
    let limit = preview_only.then_some(PREVIEW_LINES);
    let (mut text, line_count) = scan_lines(&mut reader, options.line_numbers, limit)?;

    if preview_only {
        text.push_str(TRUNCATION_NOTICE);
    }

    Ok(FileContent {
        text,
        line_count,
        size,
        modified_at,
        is_binary: false,
        truncated: preview_only,
    })
}

/// Scan lines from `reader` into a newline-terminated string.
///
/// Trailing "\n" and "\r\n" are stripped before re-appending "\n". Returns the
/// text and the number of lines scanned.
pub fn scan_lines<R: BufRead>(
    reader: &mut R,
    line_numbers: bool,
    max_lines: Option<usize>,
) -> io::Result<(String, usize)> {
    let mut content = String::new();
    let mut line = Vec::new();
    let mut count = 0usize;

    loop {
        if max_lines.is_some_and(|max| count >= max) {
            break;
        }

        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        count += 1;
        if line_numbers {
            // Writing to a String cannot fail
            let _ = write!(content, "{}\t", count);
        }
        content.push_str(&String::from_utf8_lossy(&line));
        content.push('\n');
    }

    Ok((content, count))
}

/// Binary heuristic over a sample: more than 1% NUL bytes, or more than 30%
/// control characters other than tab, LF and CR.
pub fn is_binary(sample: &[u8]) -> bool {
    let n = sample.len();
    let nul = sample.iter().filter(|&&b| b == 0).count();
    let control = sample
        .iter()
        .filter(|&&b| b < 32 && b != b'\t' && b != b'\n' && b != b'\r')
        .count();

    nul > n / 100 || control > n * 3 / 10
}
