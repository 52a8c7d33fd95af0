//! Ignore rules loaded from a `.gitignore`
//!
//! The default grammar is a reduced subset: every non-comment line is a bare
//! exclude glob, matched against the whole relative path, its basename, or any
//! single path segment. There is no negation, no anchoring, no `**` and no
//! directory-only trailing slash. `IgnoreGrammar::Git` switches to the full
//! grammar through the `ignore` crate.

use glob::{MatchOptions, Pattern};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::core::model::IgnoreGrammar;
use crate::core::paths::make_relative;

/// Name of the ignore file read from the base path
pub const IGNORE_FILE: &str = ".gitignore";

// '*' and '?' never cross a '/', like a shell glob
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

enum Matcher {
    Simple(Vec<Pattern>),
    Git(Gitignore),
}

/// Parsed exclusion patterns plus the base path they resolve against
pub struct IgnoreRuleSet {
    base_path: PathBuf,
    patterns: Vec<String>,
    matcher: Matcher,
}

impl IgnoreRuleSet {
    /// A rule set that excludes nothing
    pub fn empty(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            patterns: Vec::new(),
            matcher: Matcher::Simple(Vec::new()),
        }
    }

    /// Build a reduced-grammar rule set from raw ignore-file lines
    pub fn from_lines<'a>(
        base_path: impl Into<PathBuf>,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let patterns: Vec<String> = lines.into_iter().filter_map(parse_line).collect();
        let compiled = patterns
            .iter()
            .filter_map(|raw| match Pattern::new(&collapse_stars(raw)) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::debug!("skipping malformed ignore pattern {:?}: {}", raw, e);
                    None
                }
            })
            .collect();

        Self {
            base_path: base_path.into(),
            patterns,
            matcher: Matcher::Simple(compiled),
        }
    }

    /// Load `.gitignore` from `base_path`.
    ///
    /// Never fails: a missing or unreadable file yields an empty rule set and a
    /// warning message for the caller to surface.
    pub fn load(base_path: &Path, grammar: IgnoreGrammar) -> (Self, Option<String>) {
        let ignore_path = base_path.join(IGNORE_FILE);

        if !ignore_path.exists() {
            let warning = format!("no {} found in {}", IGNORE_FILE, base_path.display());
            return (Self::empty(base_path), Some(warning));
        }

        let lines = match read_lines(&ignore_path) {
            Ok(lines) => lines,
            Err(e) => {
                let warning = format!("error reading {}: {}", ignore_path.display(), e);
                return (Self::empty(base_path), Some(warning));
            }
        };

        match grammar {
            IgnoreGrammar::Simple => (
                Self::from_lines(base_path, lines.iter().map(String::as_str)),
                None,
            ),
            IgnoreGrammar::Git => Self::load_git(base_path, &ignore_path, &lines),
        }
    }

    fn load_git(base_path: &Path, ignore_path: &Path, lines: &[String]) -> (Self, Option<String>) {
        let mut builder = GitignoreBuilder::new(base_path);
        let mut warning = None;
        if let Some(err) = builder.add(ignore_path) {
            warning = Some(format!("error parsing {}: {}", ignore_path.display(), err));
        }

        match builder.build() {
            Ok(gitignore) => (
                Self {
                    base_path: base_path.to_path_buf(),
                    patterns: lines.iter().filter_map(|l| parse_line(l)).collect(),
                    matcher: Matcher::Git(gitignore),
                },
                warning,
            ),
            Err(err) => (
                Self::empty(base_path),
                Some(format!("error parsing {}: {}", ignore_path.display(), err)),
            ),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Bare patterns in file order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `relative_path` (relative to the base path) is excluded
    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        let relative_path = relative_path.replace('\\', "/");
        if relative_path.is_empty() || relative_path == "." {
            return false;
        }

        match &self.matcher {
            Matcher::Simple(patterns) => patterns
                .iter()
                .any(|pattern| matches_reduced(pattern, &relative_path)),
            Matcher::Git(gitignore) => gitignore.matched(&relative_path, is_dir).is_ignore(),
        }
    }

    /// Whether an absolute path is excluded; paths outside the base never are
    pub fn is_ignored_path(&self, path: &Path, is_dir: bool) -> bool {
        make_relative(path, &self.base_path)
            .map(|relative| self.is_ignored(&relative, is_dir))
            .unwrap_or(false)
    }
}

/// Turn one ignore-file line into a bare pattern, or None for blanks and comments
fn parse_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let pattern = line.trim_matches('/');
    if pattern.is_empty() {
        None
    } else {
        Some(pattern.to_string())
    }
}

/// Runs of '*' act as a single '*', so `**` never spans directories
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

fn matches_reduced(pattern: &Pattern, relative_path: &str) -> bool {
    if pattern.matches_with(relative_path, GLOB_OPTIONS) {
        return true;
    }

    let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
    if pattern.matches_with(basename, GLOB_OPTIONS) {
        return true;
    }

    relative_path
        .split('/')
        .any(|segment| pattern.matches_with(segment, GLOB_OPTIONS))
}

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    BufReader::new(file).lines().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rules(lines: &[&str]) -> IgnoreRuleSet {
        IgnoreRuleSet::from_lines("/repo", lines.iter().copied())
    }

    fn write_ignore(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(IGNORE_FILE), content).unwrap();
    }

    #[test]
    fn test_load_parses_patterns() {
        let dir = TempDir::new().unwrap();
        write_ignore(&dir, "*.log\nnode_modules/");

        let (rules, warning) = IgnoreRuleSet::load(dir.path(), IgnoreGrammar::Simple);
        assert!(warning.is_none());
        assert_eq!(rules.patterns(), &["*.log".to_string(), "node_modules".to_string()]);
        assert_eq!(rules.base_path(), dir.path());
    }

    #[test]
    fn test_load_skips_comments_blanks_and_slashes() {
        let dir = TempDir::new().unwrap();
        write_ignore(&dir, "# comment\n\n   \n/build/\n/\ntarget\n");

        let (rules, _) = IgnoreRuleSet::load(dir.path(), IgnoreGrammar::Simple);
        assert_eq!(rules.patterns(), &["build".to_string(), "target".to_string()]);
    }

    #[test]
    fn test_load_missing_file_warns_and_ignores_nothing() {
        let dir = TempDir::new().unwrap();

        let (rules, warning) = IgnoreRuleSet::load(dir.path(), IgnoreGrammar::Simple);
        assert!(warning.unwrap().contains("no .gitignore"));
        assert!(rules.patterns().is_empty());
        assert!(!rules.is_ignored("anything.txt", false));
    }

    #[test]
    fn test_extension_glob() {
        let rules = rules(&["*.log"]);
        assert!(rules.is_ignored("x.log", false));
        assert!(rules.is_ignored("dir/x.log", false));
        assert!(!rules.is_ignored("x.logger", false));
        assert!(!rules.is_ignored("test.txt", false));
    }

    #[test]
    fn test_directory_name_matches_at_any_depth() {
        let rules = rules(&["node_modules"]);
        assert!(rules.is_ignored("node_modules", true));
        assert!(rules.is_ignored("web/node_modules", true));
        assert!(rules.is_ignored("web/node_modules/pkg/index.js", false));
        assert!(!rules.is_ignored("web/node_modules_backup", true));
    }

    #[test]
    fn test_whole_path_pattern() {
        let rules = rules(&["docs/*.md"]);
        assert!(rules.is_ignored("docs/readme.md", false));
        // '*' does not cross a separator
        assert!(!rules.is_ignored("docs/api/readme.md", false));
    }

    #[test]
    fn test_root_is_never_ignored() {
        let rules = rules(&["*"]);
        assert!(!rules.is_ignored("", true));
        assert!(!rules.is_ignored(".", true));
    }

    #[test]
    fn test_negation_is_not_supported() {
        let rules = rules(&["*.log", "!keep.log"]);
        // The negated line is only a literal pattern in the reduced grammar
        assert!(rules.is_ignored("keep.log", false));
    }

    #[test]
    fn test_malformed_pattern_matches_nothing() {
        let rules = rules(&["[", "*.tmp"]);
        assert_eq!(rules.patterns().len(), 2);
        assert!(!rules.is_ignored("[", false));
        assert!(rules.is_ignored("a.tmp", false));
    }

    #[test]
    fn test_double_star_stays_within_a_segment() {
        let rules = rules(&["docs/**.md"]);
        assert!(rules.is_ignored("docs/readme.md", false));
        assert!(!rules.is_ignored("docs/api/readme.md", false));
        assert_eq!(collapse_stars("a***b*"), "a*b*");
    }

    #[test]
    fn test_windows_separators_are_normalized() {
        let rules = rules(&["build"]);
        assert!(rules.is_ignored("src\\build\\out.o", false));
    }

    #[test]
    fn test_is_ignored_path_relative_to_base() {
        let rules = rules(&["secret.txt"]);
        assert!(rules.is_ignored_path(Path::new("/repo/sub/secret.txt"), false));
        assert!(!rules.is_ignored_path(Path::new("/elsewhere/secret.txt"), false));
    }

    #[test]
    fn test_git_grammar_supports_negation() {
        let dir = TempDir::new().unwrap();
        write_ignore(&dir, "*.log\n!keep.log\n");

        let (rules, warning) = IgnoreRuleSet::load(dir.path(), IgnoreGrammar::Git);
        assert!(warning.is_none());
        assert!(rules.is_ignored("debug.log", false));
        assert!(!rules.is_ignored("keep.log", false));
    }

    #[test]
    fn test_git_grammar_anchoring() {
        let dir = TempDir::new().unwrap();
        write_ignore(&dir, "/build\n");

        let (rules, _) = IgnoreRuleSet::load(dir.path(), IgnoreGrammar::Git);
        assert!(rules.is_ignored("build", true));
        assert!(!rules.is_ignored("src/build", true));
    }
}
