//! Drive commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use wsrelay::FilesQuery;

use super::print_listing;
use crate::context::Context;

#[derive(Args, Debug)]
pub struct DriveCommand {
    #[command(subcommand)]
    pub command: DriveSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DriveSubcommand {
    /// List files
    Files(FilesArgs),
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Drive search expression, e.g. "mimeType = 'application/pdf'"
    #[arg(long, short)]
    pub query: Option<String>,

    /// Sort order, e.g. "modifiedTime desc"
    #[arg(long)]
    pub order_by: Option<String>,

    /// Files per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: DriveCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        DriveSubcommand::Files(args) => files(args, ctx).await,
    }
}

async fn files(args: FilesArgs, ctx: &Context) -> Result<()> {
    let query = FilesQuery {
        q: args.query,
        order_by: args.order_by,
        page_size: args.page_size,
        ..Default::default()
    };

    let result = ctx.client()?.drive_files(&query, ctx.options).await;
    print_listing(result, "files", args.pretty)
}
