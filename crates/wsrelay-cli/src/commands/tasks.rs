//! Tasks commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use wsrelay::{TaskListsQuery, TasksQuery};

use super::{print_listing, rfc3339};
use crate::context::Context;

#[derive(Args, Debug)]
pub struct TasksCommand {
    #[command(subcommand)]
    pub command: TasksSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TasksSubcommand {
    /// List task lists
    Lists(ListsArgs),

    /// List the tasks in one task list
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListsArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Task list id
    #[arg(long, default_value = "@default")]
    pub tasklist: String,

    /// Include or exclude completed tasks
    #[arg(long)]
    pub show_completed: Option<bool>,

    /// Only tasks due after this time (RFC 3339)
    #[arg(long)]
    pub due_min: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(cmd: TasksCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        TasksSubcommand::Lists(args) => lists(args, ctx).await,
        TasksSubcommand::List(args) => list(args, ctx).await,
    }
}

async fn lists(args: ListsArgs, ctx: &Context) -> Result<()> {
    let result = ctx
        .client()?
        .task_lists(&TaskListsQuery::default(), ctx.options)
        .await;
    print_listing(result, "task lists", args.pretty)
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let query = TasksQuery {
        tasklist: args.tasklist,
        show_completed: args.show_completed,
        due_min: args.due_min.as_deref().map(rfc3339).transpose()?,
        ..Default::default()
    };

    let result = ctx.client()?.tasks(&query, ctx.options).await;
    print_listing(result, "tasks", args.pretty)
}
