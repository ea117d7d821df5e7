//! Prompt templates sent to the text generator.
//!
//! Templates are embedded at build time and filled by replacing
//! `{{name}}` placeholders in a single pass, so substituted text is never
//! scanned for further placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

const SUMMARIZE_README: &str = include_str!("../prompts/summarize-readme.md");
const EXTRACT_FEATURES: &str = include_str!("../prompts/extract-features.md");
const SYNTHESIZE_FEATURES: &str = include_str!("../prompts/synthesize-features.md");

/// Marker a stage-one reply uses for a test that is not a feature.
pub const SKIP_MARKER: &str = "SKIP";

/// Unknown placeholders are left as they are.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn summarize_readme(readme: &str) -> String {
    render(SUMMARIZE_README, &[("readme", readme)])
}

pub fn extract_features(summary: &str, test_names: &[String]) -> String {
    render(
        EXTRACT_FEATURES,
        &[("summary", summary), ("tests", &test_names.join("\n"))],
    )
}

pub fn synthesize_features(summary: &str, features: &str) -> String {
    render(
        SYNTHESIZE_FEATURES,
        &[("summary", summary), ("features", features)],
    )
}
