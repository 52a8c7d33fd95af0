//! Renderer module
//!
//! Renders a ContextBundle to markdown or JSON, and persists it to disk

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::model::{ContextBundle, FileRecord, GitStatus};
use crate::core::paths::{ensure_parent_dir, file_name_string};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {} (expected md or json)", s)),
        }
    }
}

/// Renderer for context bundles
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a bundle to a string
    pub fn render(&self, bundle: &ContextBundle) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_markdown(bundle)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(bundle).context("Failed to serialize context")
            }
        }
    }

    /// Render and write to `path`, creating parent directories first
    pub fn save_to_file(&self, bundle: &ContextBundle, path: &Path) -> Result<()> {
        let content = self.render(bundle)?;
        ensure_parent_dir(path)
            .with_context(|| format!("Failed to create directory for {}", path.display()))?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn render_markdown(bundle: &ContextBundle) -> String {
    let scan = &bundle.scan;
    let mut output = String::new();

    output.push_str("# Repository Context\n\n");

    output.push_str("## File System Location\n\n");
    output.push_str(&format!("{}\n\n", scan.root_path.display()));

    output.push_str("## Git Info\n\n");
    match &bundle.git {
        GitStatus::Repository(info) => {
            output.push_str(&format!("- Commit: {}\n", info.commit));
            output.push_str(&format!("- Branch: {}\n", info.branch));
            output.push_str(&format!("- Author: {}\n", info.author));
            output.push_str(&format!("- Date: {}\n", info.date));
        }
        GitStatus::NotARepository => output.push_str("- Not a git repository\n"),
    }
    output.push('\n');

    output.push_str("## Structure\n\n```\n");
    if scan.directory_tree.is_empty() {
        output.push_str("(empty directory)\n");
    } else {
        output.push_str(&scan.directory_tree);
    }
    output.push_str("```\n\n");

    output.push_str("## File Contents\n\n");
    let mut files: Vec<&FileRecord> = scan
        .files
        .iter()
        .filter(|f| f.is_countable() && !f.content.trim().is_empty())
        .collect();
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    for file in files {
        render_file(&mut output, file);
    }

    output.push_str("## Summary\n\n");
    output.push_str(&format!("- Total files: {}\n", scan.total_files));
    output.push_str(&format!("- Total lines: {}\n", scan.total_lines));
    if bundle.token_counted {
        output.push_str(&format!("- Total tokens: {}\n", scan.total_tokens));
    }
    if !scan.warnings.is_empty() {
        output.push_str(&format!("- Errors encountered: {}\n", scan.warnings.len()));
    }

    output
}

fn render_file(output: &mut String, file: &FileRecord) {
    let display_path = if file.relative_path.is_empty() {
        file_name_string(&file.path)
    } else {
        file.relative_path.clone()
    };

    // Writing to a String cannot fail
    let _ = write!(output, "### File: {} ({} bytes)\t", display_path, file.size);
    match &file.modified_at {
        Some(modified) => {
            let _ = write!(output, "(Modified: {})\n\n", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        None => output.push_str("(Modified: unknown)\n\n"),
    }

    let _ = writeln!(output, "```{}", language_for(&file.path));
    output.push_str(&file.content);
    if !file.content.ends_with('\n') {
        output.push('\n');
    }
    output.push_str("```\n\n");
}

/// Code-fence language for a file, from its extension
pub fn language_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "go" => "go",
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "rs" => "rust",
        "php" => "php",
        "rb" => "ruby",
        "sh" | "bash" | "zsh" | "fish" => "bash",
        "ps1" => "powershell",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "json" => "json",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" | "cfg" | "conf" => "ini",
        "md" => "markdown",
        "sql" => "sql",
        "r" => "r",
        "m" => "matlab",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "clj" => "clojure",
        "hs" => "haskell",
        "lua" => "lua",
        "vim" => "vim",
        "dockerfile" => "dockerfile",
        "makefile" => "makefile",
        _ => "text",
    }
}
