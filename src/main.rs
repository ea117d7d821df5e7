use anyhow::Result;
use llmmd::{cli::parse_args, run_llmmd};
use log::LevelFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;

    let level = match config.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let written = run_llmmd(config).await?;
    println!("Created {}", written.display());
    Ok(())
}
