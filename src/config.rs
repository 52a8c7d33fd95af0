//! Configuration loading and merging
//!
//! Settings come from an optional TOML file and the command line. Both are
//! merged once into an immutable [`RunConfig`] that every stage borrows.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::core::model::{IgnoreGrammar, ScanOptions};
use crate::core::render::OutputFormat;
use crate::core::tokenizer::TokenModel;

/// Config file names checked in the working directory, in order
const CONFIG_CANDIDATES: &[&str] = &[".r2c.toml", ".r2c-config.toml"];

/// Config file looked up in the home directory as a last resort
const HOME_CONFIG: &str = ".r2c.toml";

/// Settings as written in a config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub output: Option<PathBuf>,
    pub no_gitignore: bool,
    #[serde(alias = "line_numbers")]
    pub display_line_num: bool,
    pub count_tokens: bool,
    pub token_model: Option<String>,
    pub verbose: bool,
    pub format: Option<String>,
    pub ignore_grammar: Option<String>,
    pub max_file_size: Option<u64>,
}

/// Load the config file named by `--config`, or the first one discovered.
///
/// An explicit file must exist and parse. A discovered file that fails to
/// parse is skipped; the returned message says why, for the caller to log
/// once logging is set up.
pub fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<(FileConfig, Option<String>)> {
    let discovered = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(cwd),
    };

    let Some(config_file) = discovered else {
        return Ok((FileConfig::default(), None));
    };

    match parse_config_file(&config_file) {
        Ok(config) => Ok((config, None)),
        Err(e) if explicit.is_none() => {
            let warning = format!(
                "ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok((FileConfig::default(), Some(warning)))
        }
        Err(e) => Err(e),
    }
}

fn parse_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading config file: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid TOML config: {}", path.display()))
}

/// Find a config file in `cwd`, falling back to the home directory
pub fn discover_config(cwd: &Path) -> Option<PathBuf> {
    for candidate in CONFIG_CANDIDATES {
        let path = cwd.join(candidate);
        if path.is_file() {
            return Some(path);
        }
    }

    if let Ok(entries) = fs::read_dir(cwd) {
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".r2c") && name.ends_with(".toml"))
            .collect();
        names.sort();
        if let Some(name) = names.first() {
            return Some(cwd.join(name));
        }
    }

    dirs::home_dir()
        .map(|home| home.join(HOME_CONFIG))
        .filter(|path| path.is_file())
}

/// Fully merged settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub output: Option<PathBuf>,
    pub skip_ignored: bool,
    pub line_numbers: bool,
    pub count_tokens: bool,
    pub token_model: TokenModel,
    pub format: OutputFormat,
    pub ignore_grammar: IgnoreGrammar,
    pub max_file_size: Option<u64>,
    pub verbose: bool,
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: None,
            skip_ignored: true,
            line_numbers: false,
            count_tokens: false,
            token_model: TokenModel::default(),
            format: OutputFormat::default(),
            ignore_grammar: IgnoreGrammar::default(),
            max_file_size: None,
            verbose: false,
            color: true,
        }
    }
}

impl RunConfig {
    /// Merge CLI arguments over file settings; boolean switches are OR-ed
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let token_model = cli
            .token_model
            .as_deref()
            .or(file.token_model.as_deref())
            .map(str::parse::<TokenModel>)
            .transpose()
            .map_err(|e| anyhow!(e))?
            .unwrap_or_default();

        let format = cli
            .format
            .as_deref()
            .or(file.format.as_deref())
            .map(str::parse::<OutputFormat>)
            .transpose()
            .map_err(|e| anyhow!(e))?
            .unwrap_or_default();

        let ignore_grammar = cli
            .ignore_grammar
            .as_deref()
            .or(file.ignore_grammar.as_deref())
            .map(str::parse::<IgnoreGrammar>)
            .transpose()
            .map_err(|e| anyhow!(e))?
            .unwrap_or_default();

        Ok(Self {
            output: cli.output.clone().or(file.output),
            skip_ignored: !(cli.no_gitignore || file.no_gitignore),
            line_numbers: cli.line_numbers || file.display_line_num,
            count_tokens: cli.count_tokens || file.count_tokens,
            token_model,
            format,
            ignore_grammar,
            max_file_size: cli.max_file_size.or(file.max_file_size),
            verbose: cli.verbose || file.verbose,
            color: !cli.no_color,
        })
    }

    /// Options for the walker
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            skip_ignored: self.skip_ignored,
            annotate_line_numbers: self.line_numbers,
            ignore_grammar: self.ignore_grammar,
            max_file_size: self.max_file_size,
        }
    }
}
