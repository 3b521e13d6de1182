//! vitrine CLI - Fragment router for static multi-page sites
//!
//! This is the main entry point for the vitrine command-line interface.
//! Each command lives in its own module under `commands`.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;
use utils::settings::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Show {
            fragment,
            format,
            warm,
        } => {
            commands::show_page(&config, fragment.as_deref(), format, warm).await?;
        },

        Commands::Warm { from, format } => {
            commands::warm_site(&config, from.as_deref(), format).await?;
        },

        Commands::Browse { from } => {
            commands::browse(&config, from.as_deref()).await?;
        },
    }

    Ok(())
}
