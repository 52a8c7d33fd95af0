//! Flows module - Pipeline stages built on the core and backends
//!
//! Provides:
//! - annotate: Token counting pass over a scan result
//! - context: Scan + tokens + git metadata for one path

pub mod annotate;
pub mod context;
