//! Simplified ignore-file matching for the directory tree.
//!
//! This is deliberately not a full gitignore implementation: `*`, `**`, `?`
//! and `!` negation have no special meaning and are compared literally.
//! Patterns are plain names, optionally anchored to the root with a leading
//! `/`.

use log::debug;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    raw: String,
}

impl IgnorePattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_root_anchored(&self) -> bool {
        self.raw.starts_with('/')
    }

    /// `relative_path` uses `/` separators and has no leading slash.
    pub fn matches(&self, relative_path: &str) -> bool {
        if let Some(anchored) = self.raw.strip_prefix('/') {
            return relative_path == anchored
                || relative_path
                    .strip_prefix(anchored)
                    .is_some_and(|rest| rest.starts_with('/'))
                || relative_path.split('/').next() == Some(anchored);
        }

        let pattern = self.raw.as_str();
        let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
        if pattern == basename || pattern == relative_path {
            return true;
        }

        // Substring hit only counts when a whole segment equals the pattern.
        relative_path.contains(pattern) && relative_path.split('/').any(|part| part == pattern)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreMatcher {
    /// Parses ignore-file text: one pattern per line, blank lines and `#`
    /// comments dropped.
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(IgnorePattern::new)
            .collect();

        Self { patterns }
    }

    /// Reads `ignore_file` from the repository root, or falls back to
    /// `defaults` when it does not exist or cannot be read.
    pub fn load(repo_root: &Path, ignore_file: &str, defaults: &[String]) -> Self {
        let path = repo_root.join(ignore_file);

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Loaded ignore patterns from {}", path.display());
                Self::parse(&content)
            }
            Err(err) => {
                debug!(
                    "No usable ignore file at {} ({err}), using defaults",
                    path.display()
                );
                Self::parse(&defaults.join("\n"))
            }
        }
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// First pattern that hides `relative_path`, in file order.
    pub fn matching_pattern(&self, relative_path: &str) -> Option<&IgnorePattern> {
        self.patterns.iter().find(|p| p.matches(relative_path))
    }

    pub fn matches(&self, relative_path: &str) -> bool {
        self.matching_pattern(relative_path).is_some()
    }
}
