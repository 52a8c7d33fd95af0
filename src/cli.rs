//! CLI module - Command-line interface definition and driver

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, RunConfig};
use crate::core::model::ContextBundle;
use crate::core::render::Renderer;
use crate::flows::context::build_context;

/// Most paths accepted in one invocation
pub const MAX_PATHS: usize = 5;

/// r2c - turn a repository or file into a structured, LLM-ready markdown context.
#[derive(Parser, Debug)]
#[command(name = "r2c")]
#[command(
    author,
    version,
    about,
    long_about = r#"r2c scans a directory (or a single file) and prints one context document:
location, git info, an indented structure tree, every readable file's content and a summary.

Entries matched by the repository's .gitignore are skipped unless --no-gitignore is given.

Config file (TOML), first match wins:
- --config <FILE>
- .r2c.toml, .r2c-config.toml or any .r2c*.toml in the working directory
- ~/.r2c.toml

Examples:
    r2c .
    r2c src README.md -o context.md
    r2c . --count-tokens --token-model cl100k
    r2c . --format json --no-gitignore
"#
)]
pub struct Cli {
    /// Directories or files to process (at most 5).
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Save output to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Disable .gitignore filtering.
    #[arg(long)]
    pub no_gitignore: bool,

    /// Prefix file content lines with their line numbers.
    #[arg(short = 'l', long)]
    pub line_numbers: bool,

    /// Count tokens per file and in total.
    #[arg(short = 't', long)]
    pub count_tokens: bool,

    /// Token model (o200k, cl100k, gpt4, gpt4o, claude3, heuristic).
    #[arg(long, value_name = "MODEL")]
    pub token_model: Option<String>,

    /// Ignore-file grammar (simple or git).
    #[arg(
        long,
        value_name = "GRAMMAR",
        long_help = "Select how .gitignore lines are interpreted.\n\n\
- simple (default): every line is a plain glob matched against the relative path,\n\
  its file name, or any single path segment\n\
- git: full gitignore grammar (negation, anchoring, **, trailing slash)"
    )]
    pub ignore_grammar: Option<String>,

    /// Show only the first 50 lines of text files larger than BYTES.
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Output format (md/json).
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Config file (TOML).
    #[arg(long, env = "R2C_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    if cli.paths.len() > MAX_PATHS {
        bail!(
            "too many paths specified ({}). Maximum allowed: {}",
            cli.paths.len(),
            MAX_PATHS
        );
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let (file_config, config_warning) = load_config(&cwd, cli.config.as_deref())?;
    let config = RunConfig::merge(&cli, file_config)?;

    init_tracing(config.verbose, config.color);
    if !config.color {
        colored::control::set_override(false);
    }
    if let Some(warning) = config_warning {
        tracing::warn!("{}", warning);
    }

    tracing::debug!("processing {} path(s): {:?}", cli.paths.len(), cli.paths);
    let renderer = Renderer::new(config.format);

    for (path, outcome) in cli.paths.iter().zip(build_all(&cli.paths, &config)) {
        let result = outcome.and_then(|bundle| emit(&bundle, &renderer, &config));
        if let Err(e) = result {
            eprintln!(
                "{} error processing path '{}': {:#}",
                "Error:".red().bold(),
                path.display(),
                e
            );
        }
    }

    tracing::debug!("completed processing all paths");
    Ok(())
}

/// Wire the verbose flag to the tracing level; RUST_LOG takes precedence
fn init_tracing(verbose: bool, ansi: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(ansi))
        .with(filter)
        .try_init();
}

#[cfg(feature = "parallel")]
fn build_all(paths: &[PathBuf], config: &RunConfig) -> Vec<Result<ContextBundle>> {
    use rayon::prelude::*;

    paths
        .par_iter()
        .map(|path| build_context(path, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_all(paths: &[PathBuf], config: &RunConfig) -> Vec<Result<ContextBundle>> {
    paths
        .iter()
        .map(|path| build_context(path, config))
        .collect()
}

/// Surface scan warnings, then print or save the rendered bundle
fn emit(bundle: &ContextBundle, renderer: &Renderer, config: &RunConfig) -> Result<()> {
    for warning in &bundle.scan.warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }

    match &config.output {
        Some(output) => {
            renderer.save_to_file(bundle, output)?;
            eprintln!("Output saved to: {}", output.display());
        }
        None => {
            let rendered = renderer.render(bundle)?;
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}
