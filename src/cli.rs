use crate::config::GeneratorConfig;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub repo_path: PathBuf,
    /// Defaults to `<repo>/<output_filename>` when unset.
    pub output_path: Option<PathBuf>,
    pub settings: GeneratorConfig,
    /// When false the backend is never contacted and every stage falls back.
    pub use_llm: bool,
    pub verbosity: u8,
}

impl Config {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            output_path: None,
            settings: GeneratorConfig::default(),
            use_llm: true,
            verbosity: 0,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.repo_path.join(&self.settings.output_filename))
    }
}

pub fn build_command() -> Command {
    Command::new("llmmd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Writes a Markdown overview of a repository for AI assistants and new engineers")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("The path to the project repository")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Sets the output .md file path (default: <PATH>/.llm.md)")
                .num_args(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("PROVIDER/MODEL")
                .help("Model used for summaries, e.g. openai/gpt-5.1 or anthropic/claude-sonnet-4-5 (env: GENERATOR_MODEL)")
                .num_args(1),
        )
        .arg(
            Arg::new("max-depth")
                .short('d')
                .long("max-depth")
                .value_name("N")
                .help("How many directory levels the tree shows")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            Arg::new("no-llm")
                .long("no-llm")
                .help("Do not call the model; use README excerpts and raw test names")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
}

pub fn parse_args() -> Result<Config> {
    config_from_matches(&build_command().get_matches())
}

pub fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let mut settings = GeneratorConfig::from_env()?;

    if let Some(model) = matches.get_one::<String>("model") {
        settings.model = model.clone();
    }
    if let Some(depth) = matches.get_one::<usize>("max-depth") {
        settings.max_depth = *depth;
    }

    let repo_path = matches
        .get_one::<String>("path")
        .map(|p| match p.trim_end_matches('/') {
            "" => PathBuf::from(p),
            trimmed => PathBuf::from(trimmed),
        })
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(Config {
        repo_path,
        output_path: matches.get_one::<String>("output").map(PathBuf::from),
        settings,
        use_llm: !matches.get_flag("no-llm"),
        verbosity: matches.get_count("verbose"),
    })
}
