//! Backends module - Filesystem and subprocess access
//!
//! Provides:
//! - scan: Directory walking with ignore-rule pruning
//! - git: Last-commit metadata through the git CLI

pub mod git;
pub mod scan;
