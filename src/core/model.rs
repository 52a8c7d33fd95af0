//! Scan data model
//!
//! Every scan produces one [`ScanResult`] holding a flat list of [`FileRecord`]s.
//! The walker populates it, the token pass updates the token fields, and the
//! formatter consumes it. Nothing here outlives a single invocation.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Which ignore-file grammar the matcher applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreGrammar {
    /// Reduced subset: plain globs matched against the path, its basename, or any segment
    #[default]
    Simple,
    /// Full gitignore grammar (negation, anchoring, `**`, trailing slash)
    Git,
}

impl std::str::FromStr for IgnoreGrammar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" | "default" => Ok(IgnoreGrammar::Simple),
            "git" | "gitignore" | "full" => Ok(IgnoreGrammar::Git),
            _ => Err(format!("Unknown ignore grammar: {} (expected simple or git)", s)),
        }
    }
}

/// Options recognized by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Consult the ignore file and prune matching entries
    pub skip_ignored: bool,
    /// Prefix every content line with its 1-based number and a tab
    pub annotate_line_numbers: bool,
    pub ignore_grammar: IgnoreGrammar,
    /// Text files larger than this keep only a short preview
    pub max_file_size: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            skip_ignored: true,
            annotate_line_numbers: false,
            ignore_grammar: IgnoreGrammar::Simple,
            max_file_size: None,
        }
    }
}

/// Where a per-record failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorKind {
    /// Opening or reading the file content failed
    Read,
    /// The entry could not be listed or stat'ed
    Access,
}

/// Failure descriptor attached to a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    pub kind: RecordErrorKind,
    pub message: String,
}

impl RecordError {
    pub fn new(kind: RecordErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One filesystem entry discovered during a walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute filesystem path
    pub path: PathBuf,

    /// Path relative to the scan root using '/' separators; empty only for the root
    pub relative_path: String,

    pub is_dir: bool,

    /// Size in bytes (files only)
    pub size: u64,

    /// Full text content (files only, empty on error or for binary files)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// Number of lines read into `content`
    pub line_count: usize,

    #[serde(default)]
    pub is_binary: bool,

    /// Content holds only a preview of an oversized file
    #[serde(default)]
    pub truncated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Local>>,

    /// Zero until the token pass runs
    pub token_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

impl FileRecord {
    /// Create a directory record
    pub fn directory(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            is_dir: true,
            ..Self::file(path, relative_path)
        }
    }

    /// Create an empty file record, to be filled by the content reader
    pub fn file(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            is_dir: false,
            size: 0,
            content: String::new(),
            line_count: 0,
            is_binary: false,
            truncated: false,
            modified_at: None,
            token_count: 0,
            error: None,
        }
    }

    /// Attach an error, clearing every field that would otherwise feed the aggregates
    pub fn with_error(mut self, error: RecordError) -> Self {
        self.content.clear();
        self.size = 0;
        self.line_count = 0;
        self.token_count = 0;
        self.error = Some(error);
        self
    }

    /// Whether this record contributes to `total_files`, `total_lines` and `total_tokens`
    pub fn is_countable(&self) -> bool {
        !self.is_dir && self.error.is_none()
    }
}

/// The bundle produced by one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Absolute root of the scan
    pub root_path: PathBuf,
    /// Records in discovery order
    pub files: Vec<FileRecord>,
    /// Rendered hierarchy, derived from `files`
    pub directory_tree: String,
    pub total_files: usize,
    pub total_lines: usize,
    pub total_tokens: usize,
    /// Non-fatal issues, in the order they were met
    pub warnings: Vec<String>,
}

impl ScanResult {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            files: Vec::new(),
            directory_tree: String::new(),
            total_files: 0,
            total_lines: 0,
            total_tokens: 0,
            warnings: Vec::new(),
        }
    }

    /// Append a record and fold it into the aggregates
    pub fn push_record(&mut self, record: FileRecord) {
        if record.is_countable() {
            self.total_files += 1;
            self.total_lines += record.line_count;
            self.total_tokens += record.token_count;
        }
        self.files.push(record);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Records that failed, in discovery order
    pub fn failed_records(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| f.error.is_some())
    }
}

/// Last-commit details of a work tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub commit: String,
    pub branch: String,
    pub author: String,
    pub date: String,
}

/// Git state of a scan root
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GitStatus {
    Repository(GitInfo),
    #[default]
    NotARepository,
}

/// Everything the formatter renders for one scan root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    pub scan: ScanResult,
    pub git: GitStatus,
    /// Token pass ran, so `total_tokens` is meaningful
    pub token_counted: bool,
}

/// Fatal errors that abort a scan or a token pass
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path does not exist: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking directory {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to get encoding {encoding}: {reason}")]
    EncoderInit { encoding: String, reason: String },
}
