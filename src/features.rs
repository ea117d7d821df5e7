//! Turns raw test names into the feature list of the overview.
//!
//! Stage one asks the backend to rewrite each name as a feature statement or
//! mark it `SKIP`; stage two groups the survivors into a handful of
//! capability bullets. If either call fails the raw names are returned
//! instead, one per line.

use crate::config::GeneratorConfig;
use crate::extractor::TestNameExtractor;
use crate::llm::{GenerateError, TextGenerator};
use crate::prompts::{self, SKIP_MARKER};
use log::{debug, info, warn};
use std::path::Path;

/// Feature text when the repository has no recognisable tests.
pub const NO_TESTS_FOUND: &str = "No feature tests found";

pub struct FeatureSynthesizer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> FeatureSynthesizer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Never fails: backend errors degrade to the raw name list.
    pub fn synthesize(&self, summary: &str, raw_names: &[String]) -> String {
        if raw_names.is_empty() {
            debug!("No test names to synthesize");
            return String::new();
        }

        match self.run_stages(summary, raw_names) {
            Ok(features) => features,
            Err(err) => {
                warn!("Feature synthesis unavailable, listing raw test names: {err}");
                raw_names.join("\n")
            }
        }
    }

    fn run_stages(&self, summary: &str, raw_names: &[String]) -> Result<String, GenerateError> {
        let extracted = self
            .generator
            .generate(&prompts::extract_features(summary, raw_names))?;
        let kept = drop_skipped(&extracted);
        info!("Stage one kept {} feature statements", kept.len());

        self.generator
            .generate(&prompts::synthesize_features(summary, &kept.join("\n")))
    }
}

/// Lines of a stage-one reply, minus the `SKIP` markers.
fn drop_skipped(reply: &str) -> Vec<&str> {
    reply
        .lines()
        .filter(|line| line.trim() != SKIP_MARKER)
        .collect()
}

/// Extracts test names from the configured test directory and synthesizes
/// them, or returns [`NO_TESTS_FOUND`] when there are none.
pub fn describe_features(
    repo_root: &Path,
    config: &GeneratorConfig,
    generator: &dyn TextGenerator,
    summary: &str,
) -> String {
    let tests_root = repo_root.join(&config.tests_dir);
    let names = TestNameExtractor::new(config.test_extensions.clone()).extract(&tests_root);

    if names.is_empty() {
        return NO_TESTS_FOUND.to_string();
    }

    FeatureSynthesizer::new(generator).synthesize(summary, names.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::DisabledGenerator;
    use std::sync::Mutex;

    /// Replies from a fixed script and records every prompt.
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, GenerateError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, GenerateError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(GenerateError::Disabled))
        }
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_stages_return_stage_two_verbatim() {
        let generator = ScriptedGenerator::new(vec![
            Ok("Create users\nSKIP\nUpdate users\n  SKIP  ".to_string()),
            Ok("• Manage users\n• Track changes".to_string()),
        ]);

        let result = FeatureSynthesizer::new(&generator).synthesize(
            "A user admin tool.",
            &names(&["Can create a user", "Validates email", "Can update a user", "Renders"]),
        );
        assert_eq!(result, "• Manage users\n• Track changes");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Can create a user\nValidates email"));
        assert!(prompts[0].contains("A user admin tool."));
        assert!(prompts[1].contains("Create users\nUpdate users"));
        assert!(!prompts[1].contains("SKIP\n"));
    }

    #[test]
    fn test_first_stage_failure_falls_back_to_raw_names() {
        let generator = ScriptedGenerator::new(vec![Err(GenerateError::MissingCredentials(
            "OPENAI_API_KEY is not set".to_string(),
        ))]);

        let raw = names(&["Can create a user", "Can update a user"]);
        let result = FeatureSynthesizer::new(&generator).synthesize("summary", &raw);
        assert_eq!(result, "Can create a user\nCan update a user");
        assert_eq!(generator.prompts().len(), 1);
    }

    #[test]
    fn test_second_stage_failure_falls_back_to_raw_names() {
        let generator = ScriptedGenerator::new(vec![
            Ok("Create users".to_string()),
            Err(GenerateError::Status {
                status: 500,
                body: "oops".to_string(),
            }),
        ]);

        let result =
            FeatureSynthesizer::new(&generator).synthesize("summary", &names(&["Can create a user"]));
        assert_eq!(result, "Can create a user");
    }

    #[test]
    fn test_empty_names_are_accepted() {
        let generator = ScriptedGenerator::new(vec![]);
        let result = FeatureSynthesizer::new(&generator).synthesize("summary", &[]);
        assert_eq!(result, "");
        assert!(generator.prompts().is_empty());
    }

    #[test]
    fn test_describe_features_without_tests_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = describe_features(
            temp_dir.path(),
            &GeneratorConfig::default(),
            &DisabledGenerator,
            "summary",
        );
        assert_eq!(result, NO_TESTS_FOUND);
    }

    #[test]
    fn test_describe_features_fallback_lists_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tests_dir = temp_dir.path().join("tests/Feature");
        std::fs::create_dir_all(&tests_dir).unwrap();
        std::fs::write(
            tests_dir.join("UserTest.php"),
            "<?php\npublic function can_create_a_user() {}\npublic function can_create_a_user() {}\n",
        )
        .unwrap();

        let result = describe_features(
            temp_dir.path(),
            &GeneratorConfig::default(),
            &DisabledGenerator,
            "summary",
        );
        assert_eq!(result, "Can create a user");
    }
}
