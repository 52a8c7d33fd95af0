//! Core module - Data model and the pure building blocks of a scan
//!
//! This module provides:
//! - Scan result model (FileRecord, ScanResult, ScanError)
//! - Path resolution and normalization
//! - Ignore-rule parsing and matching
//! - Single-file content reading
//! - Token counting
//! - Directory tree rendering
//! - Markdown/JSON rendering of the final bundle

pub mod file_reader;
pub mod ignore_rules;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod tree;
