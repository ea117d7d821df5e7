//! Test-name extraction.
//!
//! Two conventions are recognised and scanned independently over each file:
//!
//! - method declarations (`public function can_create_a_user()`), whose
//!   snake_case names are turned into sentences;
//! - inline specs (`it("can update a user", function() {`), whose
//!   descriptions are already prose and are only capitalised.

use crate::filewalker::collect_source_files;
use crate::utils::{capitalize_first, read_text_file};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

static METHOD_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"public function ([a-zA-Z0-9_]+)").expect("valid regex"));

static INLINE_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\b(?:it|test)\(['"](.*?)['"],\s*function\s*\(\)\s*\{"#).expect("valid regex")
});

const LIFECYCLE_METHODS: &[&str] = &["setUp", "tearDown", "setUpBeforeClass", "tearDownAfterClass"];

/// Test names in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestNames {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl TestNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the name was already present.
    pub fn insert(&mut self, name: String) -> bool {
        if self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl<S: Into<String>> FromIterator<S> for TestNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names = TestNames::new();
        for name in iter {
            names.insert(name.into());
        }
        names
    }
}

pub struct TestNameExtractor {
    extensions: Vec<String>,
}

impl TestNameExtractor {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Walks `tests_root` recursively. A missing directory, like one without
    /// any recognisable tests, yields an empty result.
    pub fn extract(&self, tests_root: &Path) -> TestNames {
        let mut names = TestNames::new();
        let mut duplicates = 0usize;

        if !tests_root.is_dir() {
            debug!("No test directory at {}", tests_root.display());
            return names;
        }

        for path in collect_source_files(tests_root, &self.extensions) {
            let content = match read_text_file(&path) {
                Ok(Some(content)) => content,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Skipping unreadable test file: {err:#}");
                    continue;
                }
            };

            for name in extract_from_source(&content) {
                if !names.insert(name) {
                    duplicates += 1;
                }
            }
        }

        debug!(
            "Extracted {} test names ({duplicates} duplicates dropped)",
            names.len()
        );
        names
    }
}

/// Names found in one file: method declarations first, then inline specs.
pub fn extract_from_source(content: &str) -> Vec<String> {
    let methods = METHOD_DECLARATION
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !LIFECYCLE_METHODS.contains(name))
        .map(|name| capitalize_first(&name.replace('_', " ")));

    let specs = INLINE_SPEC
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| capitalize_first(m.as_str()));

    methods.chain(specs).collect()
}
