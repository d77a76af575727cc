//! VirJoy cockpit bridge
//!
//! Serves the touchscreen cockpit over HTTP and offers a few one-shot
//! inspection commands.

use anyhow::Result;
use clap::Parser;

mod cli;
use cli::{Cli, Commands};

mod commands;

#[rocket::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let loaded = commands::load_config(cli.config, cli.port, cli.dry_run)?;
    let config = loaded.config;

    match cli.command {
        None | Some(Commands::Serve) => commands::serve::run(config).await,
        Some(Commands::Profiles { id }) => commands::inspect::profiles(&config, id.as_deref()),
        Some(Commands::Vars { profile }) => {
            commands::inspect::vars(&config, profile.as_deref()).await
        }
        Some(Commands::Decode { hex }) => commands::inspect::decode(&hex),
        Some(Commands::Config { write }) => {
            commands::inspect::config(&config, &loaded.path, write)
        }
    }
}
