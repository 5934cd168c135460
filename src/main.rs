// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! zonepager CLI
//!
//! Pages through list operations and writes the records to stdout

use anyhow::{Context, Result};
use clap::Parser;
use zonepager::cli::{Cli, Commands, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so record output stays machine readable
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let action = match &cli.command {
        Commands::List { operation, .. } => format!("listing {operation}"),
        Commands::Operations => "printing operations".to_string(),
        Commands::Validate => "validating configuration".to_string(),
    };

    Runner::new(cli)
        .run()
        .await
        .with_context(|| format!("zonepager failed while {action}"))
}
