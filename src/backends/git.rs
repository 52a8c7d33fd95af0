//! Git metadata for the context header
//!
//! Shells out to `git` in the scan root. Anything that goes wrong (git missing,
//! not a work tree, no commits yet) degrades to [`GitStatus::NotARepository`].

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::core::model::{GitInfo, GitStatus};

/// Collect git info for `path`; never fails, only downgrades
pub fn git_status(path: &Path) -> GitStatus {
    match git_info(path) {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!("failed to get git info for {}: {:#}", path.display(), e);
            GitStatus::NotARepository
        }
    }
}

/// Query git for the last commit in the work tree containing `path`
pub fn git_info(path: &Path) -> Result<GitStatus> {
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };

    match run_git(dir, &["rev-parse", "--is-inside-work-tree"]) {
        Ok(inside) if inside == "true" => {}
        _ => {
            tracing::debug!("{} is not inside a git work tree", dir.display());
            return Ok(GitStatus::NotARepository);
        }
    }

    Ok(GitStatus::Repository(GitInfo {
        commit: run_git(dir, &["log", "-1", "--pretty=%H"])?,
        branch: run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?,
        author: run_git(dir, &["log", "-1", "--pretty=%an <%ae>"])?,
        date: run_git(dir, &["log", "-1", "--pretty=%ad"])?,
    }))
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
