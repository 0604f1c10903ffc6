//! Gmail commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use wsrelay::ThreadsQuery;

use super::print_listing;
use crate::context::Context;

#[derive(Args, Debug)]
pub struct GmailCommand {
    #[command(subcommand)]
    pub command: GmailSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GmailSubcommand {
    /// List threads (ids and snippets)
    Threads(ThreadsArgs),
}

#[derive(Args, Debug)]
pub struct ThreadsArgs {
    /// Gmail search expression, e.g. "is:unread newer_than:7d"
    #[arg(long, short)]
    pub query: Option<String>,

    /// Threads per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Include spam and trash
    #[arg(long)]
    pub include_spam_trash: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: GmailCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        GmailSubcommand::Threads(args) => threads(args, ctx).await,
    }
}

async fn threads(args: ThreadsArgs, ctx: &Context) -> Result<()> {
    let query = ThreadsQuery {
        q: args.query,
        max_results: args.page_size,
        include_spam_trash: args.include_spam_trash.then_some(true),
        ..Default::default()
    };

    let result = ctx.client()?.gmail_threads(&query, ctx.options).await;
    print_listing(result, "threads", args.pretty)
}
