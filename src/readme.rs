use crate::llm::TextGenerator;
use crate::prompts;
use crate::utils::truncate_chars;
use log::{debug, warn};
use std::fs;
use std::path::Path;

pub const NO_README: &str = "No README found";
pub const STUB_README: &str = "Only Laravel stub readme found";

/// A sentence only found in the README that ships with a fresh Laravel app.
const STUB_MARKER: &str = "Laravel is a web application framework with expressive";

pub struct ReadmeSummarizer<'a> {
    generator: &'a dyn TextGenerator,
    preview_chars: usize,
}

impl<'a> ReadmeSummarizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator, preview_chars: usize) -> Self {
        Self {
            generator,
            preview_chars,
        }
    }

    /// Summarizes `README.md`. Falls back to the start of the README when the
    /// backend is unavailable.
    pub fn summarize(&self, repo_root: &Path) -> String {
        let path = repo_root.join("README.md");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                debug!("No README at {}: {err}", path.display());
                return NO_README.to_string();
            }
        };

        if content.contains(STUB_MARKER) {
            return STUB_README.to_string();
        }

        match self.generator.generate(&prompts::summarize_readme(&content)) {
            Ok(summary) => summary.trim().to_string(),
            Err(err) => {
                warn!("README summary unavailable, using an excerpt: {err}");
                format!("{}...", truncate_chars(&content, self.preview_chars))
            }
        }
    }
}
