//! Context flow - Scan, annotate and attach git metadata for one path

use anyhow::{Context, Result};
use std::path::Path;

use crate::backends::git::git_status;
use crate::backends::scan::scan_path;
use crate::config::RunConfig;
use crate::core::model::ContextBundle;
use crate::flows::annotate::annotate_with_model;

/// Build the bundle the formatter renders for `path`
pub fn build_context(path: &Path, config: &RunConfig) -> Result<ContextBundle> {
    tracing::debug!("processing {}", path.display());

    let mut scan = scan_path(path, &config.scan_options())
        .with_context(|| format!("Failed to scan {}", path.display()))?;

    if config.count_tokens {
        scan = annotate_with_model(scan, config.token_model).context("Token counting failed")?;
    }

    let git = git_status(&scan.root_path);

    Ok(ContextBundle {
        scan,
        git,
        token_counted: config.count_tokens,
    })
}
