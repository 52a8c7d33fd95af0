//! r2c - Turn a repository or file into an LLM-ready context document
//!
//! r2c provides:
//! - Depth-first scanning with .gitignore pruning
//! - File contents with optional line numbers and token counts
//! - An indented structure tree and git metadata
//! - Markdown or JSON output, to stdout or a file

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod config;
mod core;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
