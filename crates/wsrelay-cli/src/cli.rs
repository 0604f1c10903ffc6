//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{
    auth::AuthCommand, calendar::CalendarCommand, contacts::ContactsCommand, drive::DriveCommand,
    gmail::GmailCommand, tasks::TasksCommand,
};

/// Google Workspace listings with a self-refreshing OAuth credential.
#[derive(Parser, Debug)]
#[command(name = "wsrelay")]
#[command(author, version = env!("WSRELAY_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the credential comes from and how listings are bounded.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Read the authorized-user JSON from this file instead of the environment
    #[arg(long, env = "WSRELAY_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,

    /// Environment variable holding the authorized-user JSON
    #[arg(long, default_value = "GOOGLE_TOKEN", global = true)]
    pub secret_name: String,

    /// Environment variable tried when the primary one is unset or empty
    #[arg(long, default_value = "RAILWAY_TOKEN_JSON", global = true)]
    pub fallback_secret_name: String,

    /// Send every API request to this base URL instead of Google
    #[arg(long, env = "WSRELAY_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Maximum number of pages fetched per listing
    #[arg(long, env = "WSRELAY_MAX_PAGES", default_value_t = 50, global = true)]
    pub max_pages: usize,

    /// Per-page timeout in seconds
    #[arg(long, env = "WSRELAY_PAGE_TIMEOUT", default_value_t = 30, global = true)]
    pub page_timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or refresh the credential
    Auth(AuthCommand),

    /// Google Calendar
    Calendar(CalendarCommand),

    /// Gmail
    Gmail(GmailCommand),

    /// Google Drive
    Drive(DriveCommand),

    /// Google Tasks
    Tasks(TasksCommand),

    /// Google Contacts (People API)
    Contacts(ContactsCommand),
}
