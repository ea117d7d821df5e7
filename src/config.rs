//! Generator settings.
//!
//! All tunables live in one immutable [`GeneratorConfig`] that is handed to
//! each component when it is built. Nothing reads ambient global state after
//! startup.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "openai/gpt-5.1";

/// Used when the repository has no ignore file of its own.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "vendor",
    "node_modules",
    ".git",
    ".env",
    ".env.local",
    ".env.development.local",
    ".env.test.local",
    ".env.production.local",
];

/// Root-level directories that rarely help an overview.
pub const DEFAULT_SKIP_AT_ROOT: &[&str] = &["database", "public", "storage", "bootstrap", "config"];

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Backend model in `provider/model` form.
    pub model: String,
    pub max_tokens: u32,
    /// Sampling temperature, sent only to backends that accept one.
    pub temperature: f32,
    /// Tree levels rendered below the repository root.
    pub max_depth: usize,
    pub skip_at_root: Vec<String>,
    pub default_ignore_patterns: Vec<String>,
    /// Ignore file looked up in the repository root.
    pub ignore_file: String,
    /// Test directory, relative to the repository root.
    pub tests_dir: PathBuf,
    /// Extensions (without the dot) of files scanned for test names.
    pub test_extensions: Vec<String>,
    pub output_filename: String,
    /// How much of the README to keep when it cannot be summarized.
    pub readme_preview_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 100_000,
            temperature: 0.7,
            max_depth: 4,
            skip_at_root: to_owned_list(DEFAULT_SKIP_AT_ROOT),
            default_ignore_patterns: to_owned_list(DEFAULT_IGNORE_PATTERNS),
            ignore_file: ".gitignore".to_string(),
            tests_dir: PathBuf::from("tests").join("Feature"),
            test_extensions: vec!["php".to_string()],
            output_filename: ".llm.md".to_string(),
            readme_preview_chars: 500,
        }
    }
}

impl GeneratorConfig {
    /// Defaults with `GENERATOR_MODEL`, `GENERATOR_MAX_TOKENS` and
    /// `GENERATOR_TEMPERATURE` applied.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(model) = lookup("GENERATOR_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(raw) = lookup("GENERATOR_MAX_TOKENS") {
            config.max_tokens = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid GENERATOR_MAX_TOKENS value: {raw:?}"))?;
        }

        if let Some(raw) = lookup("GENERATOR_TEMPERATURE") {
            config.temperature = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid GENERATOR_TEMPERATURE value: {raw:?}"))?;
        }

        Ok(config)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
