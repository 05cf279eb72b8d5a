// ABOUTME: Entry point for the tunnelfleet CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tunnelfleet::error::Result;
use tunnelfleet::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    match run(cli, mode).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Output::new(mode).error(e.kind(), &e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<i32> {
    let config = cli.config.as_deref();
    let output = Output::new(mode);

    match cli.command {
        Commands::Up => commands::up(config, output).await.map(|()| 0),
        Commands::Down => commands::down(config, output).await.map(|()| 0),
        Commands::List => commands::list(config, output).await.map(|()| 0),
        Commands::Run { command } => commands::run(config, &command, output).await,
        Commands::Interactive { shell } => commands::interactive(config, &shell).await,
    }
}
