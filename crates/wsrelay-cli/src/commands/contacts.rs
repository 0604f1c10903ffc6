//! Contacts commands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use wsrelay::{ConnectionsQuery, SearchContactsQuery};

use super::print_listing;
use crate::context::Context;
use crate::output;

/// Fields requested when none are given.
const DEFAULT_FIELDS: &str = wsrelay::google::DEFAULT_PERSON_FIELDS;

#[derive(Args, Debug)]
pub struct ContactsCommand {
    #[command(subcommand)]
    pub command: ContactsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ContactsSubcommand {
    /// List the user's contacts
    List(ListArgs),

    /// Search contacts by name, email or phone prefix
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Comma-separated person fields to return
    #[arg(long, default_value = DEFAULT_FIELDS)]
    pub person_fields: String,

    /// Contacts per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to search for
    pub query: String,

    /// Comma-separated person fields to return
    #[arg(long, default_value = DEFAULT_FIELDS)]
    pub read_mask: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: ContactsCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        ContactsSubcommand::List(args) => list(args, ctx).await,
        ContactsSubcommand::Search(args) => search(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let query = ConnectionsQuery {
        person_fields: args.person_fields,
        page_size: args.page_size,
        ..Default::default()
    };

    let result = ctx.client()?.contacts(&query, ctx.options).await;
    print_listing(result, "contacts", args.pretty)
}

async fn search(args: SearchArgs, ctx: &Context) -> Result<()> {
    let query = SearchContactsQuery {
        read_mask: args.read_mask,
        ..SearchContactsQuery::new(args.query)
    };

    let results = ctx
        .client()?
        .search_contacts(&query)
        .await
        .context("Failed to search contacts")?;

    output::items(&results, args.pretty)?;
    output::success(&format!("{} matches", results.len()));
    Ok(())
}
