//! # llmmd Library
//!
//! Scans a repository and writes a single Markdown overview of it: a README
//! summary, the tech stack, a filtered directory tree, route entry points and
//! a feature list distilled from the test suite.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use llmmd::{Config, run_llmmd};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::new("/path/to/repo");
//!     config.use_llm = false;
//!
//!     let written = run_llmmd(config).await?;
//!     println!("Created {}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! The pieces can also be used on their own:
//!
//! ```rust
//! use llmmd::IgnoreMatcher;
//!
//! let matcher = IgnoreMatcher::parse("vendor\n/build");
//! assert!(matcher.matches("app/vendor"));
//! assert!(!matcher.matches("src/build"));
//! ```

pub mod cli;
pub mod config;
pub mod extractor;
pub mod features;
pub mod filewalker;
pub mod gitignore;
pub mod llm;
pub mod project;
pub mod prompts;
pub mod readme;
pub mod tree;
pub mod utils;
pub mod writer;

pub use cli::Config;
pub use config::GeneratorConfig;
pub use extractor::{TestNameExtractor, TestNames};
pub use features::{FeatureSynthesizer, NO_TESTS_FOUND, describe_features};
pub use gitignore::{IgnoreMatcher, IgnorePattern};
pub use llm::{DisabledGenerator, GenerateError, TextGenerator, build_generator};
pub use readme::ReadmeSummarizer;
pub use tree::TreeRenderer;
pub use writer::{MarkdownWriter, OUTPUT_HEADER, Overview};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fails unless `repo_root` is a directory holding a manifest file.
pub fn validate_repository(repo_root: &Path) -> Result<()> {
    if !repo_root.is_dir() {
        bail!("Directory not found: {}", repo_root.display());
    }
    if !repo_root.join(project::MANIFEST_FILE).is_file() {
        bail!(
            "No {} found in the specified directory.",
            project::MANIFEST_FILE
        );
    }
    Ok(())
}

/// Gathers every section of the overview. Blocking: reads the filesystem and
/// calls the generator, one request at a time.
pub fn build_overview(
    repo_root: &Path,
    settings: &GeneratorConfig,
    generator: &dyn TextGenerator,
) -> Overview {
    info!("Summarizing README...");
    let summary =
        ReadmeSummarizer::new(generator, settings.readme_preview_chars).summarize(repo_root);

    info!("Detecting tech stack...");
    let tech_stack = project::detect_tech_stack(repo_root);

    info!("Generating directory tree...");
    let directory_tree =
        TreeRenderer::for_repository(repo_root, settings).render(repo_root, settings.max_depth);

    info!("Detecting entry points...");
    let entry_points = project::detect_entry_points(repo_root);

    info!("Extracting and filtering test features...");
    let features = describe_features(repo_root, settings, generator, &summary);

    Overview {
        summary,
        tech_stack,
        directory_tree,
        entry_points,
        features,
    }
}

/// Generates the overview and writes it, returning the output path.
pub async fn run_llmmd(config: Config) -> Result<PathBuf> {
    validate_repository(&config.repo_path)?;
    info!("Generating overview for: {}", config.repo_path.display());

    let repo_root = config.repo_path.clone();
    let settings = config.settings.clone();
    let use_llm = config.use_llm;

    // The HTTP client blocks, so it is built and dropped off the runtime.
    let overview = tokio::task::spawn_blocking(move || -> Result<Overview> {
        let generator = build_generator(&settings, use_llm)?;
        Ok(build_overview(&repo_root, &settings, generator.as_ref()))
    })
    .await
    .context("Overview task panicked")??;

    write_overview(&config, &overview).await
}

/// Same as [`run_llmmd`] with a caller-supplied generator.
pub async fn run_with_generator(
    config: Config,
    generator: Arc<dyn TextGenerator>,
) -> Result<PathBuf> {
    validate_repository(&config.repo_path)?;

    let repo_root = config.repo_path.clone();
    let settings = config.settings.clone();

    let overview = tokio::task::spawn_blocking(move || {
        build_overview(&repo_root, &settings, generator.as_ref())
    })
    .await
    .context("Overview task panicked")?;

    write_overview(&config, &overview).await
}

async fn write_overview(config: &Config, overview: &Overview) -> Result<PathBuf> {
    let output_path = config.output_path();

    let mut md_writer = MarkdownWriter::create(&output_path).await?;
    md_writer.write_overview(overview, Utc::now()).await?;

    info!("Created {}", output_path.display());
    Ok(output_path)
}
