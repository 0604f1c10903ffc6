//! wsrelay - CLI for Google Workspace listings.
//!
//! This is a thin wrapper over the `wsrelay` library: it loads the OAuth
//! credential, keeps it fresh, and prints each listing as JSON lines.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, calendar, contacts, drive, gmail, tasks};
use context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let ctx = Context::from_args(&cli.config)?;

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &ctx).await,
        Commands::Calendar(cmd) => calendar::handle(cmd, &ctx).await,
        Commands::Gmail(cmd) => gmail::handle(cmd, &ctx).await,
        Commands::Drive(cmd) => drive::handle(cmd, &ctx).await,
        Commands::Tasks(cmd) => tasks::handle(cmd, &ctx).await,
        Commands::Contacts(cmd) => contacts::handle(cmd, &ctx).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries the listing, so logs go to stderr
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
