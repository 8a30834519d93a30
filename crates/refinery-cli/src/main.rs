//! Refinery CLI - Command-line interface for the Refinery content pipeline.

use clap::Parser;
use refinery_cli::commands;
use refinery_cli::{Cli, Command, Config, Formatter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> refinery_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load config, falling back to defaults when there is no file
    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    // Determine output format
    let format = cli
        .output
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    match cli.command {
        Command::Process(args) => {
            commands::execute_process(args, &config, &formatter).await?;
        }
        Command::Chunk(args) => {
            commands::execute_chunk(args, &config, &formatter)?;
        }
        Command::Merge(args) => {
            commands::execute_merge(args, &config, &formatter).await?;
        }
        Command::Posts(args) => {
            commands::execute_posts(args, &config, &formatter)?;
        }
        Command::Templates(args) => {
            commands::execute_templates(args, &config, &formatter)?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
    }

    Ok(())
}
