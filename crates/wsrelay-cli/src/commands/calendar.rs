//! Calendar commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use wsrelay::EventsQuery;

use super::{print_listing, rfc3339};
use crate::context::Context;

#[derive(Args, Debug)]
pub struct CalendarCommand {
    #[command(subcommand)]
    pub command: CalendarSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CalendarSubcommand {
    /// List events, expanding recurring events into instances
    Events(EventsArgs),
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Calendar to list
    #[arg(long, default_value = "primary")]
    pub calendar_id: String,

    /// Only events ending after this time (RFC 3339)
    #[arg(long)]
    pub time_min: Option<String>,

    /// Only events starting before this time (RFC 3339)
    #[arg(long)]
    pub time_max: Option<String>,

    /// Events per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: CalendarCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        CalendarSubcommand::Events(args) => events(args, ctx).await,
    }
}

async fn events(args: EventsArgs, ctx: &Context) -> Result<()> {
    let query = EventsQuery {
        calendar_id: args.calendar_id,
        time_min: args.time_min.as_deref().map(rfc3339).transpose()?,
        time_max: args.time_max.as_deref().map(rfc3339).transpose()?,
        max_results: args.page_size,
        ..Default::default()
    };

    let result = ctx.client()?.calendar_events(&query, ctx.options).await;
    print_listing(result, "events", args.pretty)
}
