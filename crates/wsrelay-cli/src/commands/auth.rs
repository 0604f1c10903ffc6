//! Credential commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use colored::Colorize;
use tracing::warn;
use wsrelay::{CredentialRecord, CredentialState};

use crate::context::Context;
use crate::output;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Show the loaded credential without contacting Google
    Status,

    /// Refresh the access token if it has expired
    Refresh(RefreshArgs),
}

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Write the refreshed credential to this file (authorized-user JSON)
    #[arg(long)]
    pub write: Option<PathBuf>,
}

pub async fn handle(cmd: AuthCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Status => status(ctx).await,
        AuthSubcommand::Refresh(args) => refresh(args, ctx).await,
    }
}

async fn status(ctx: &Context) -> Result<()> {
    let record = ctx.credentials.snapshot().await;
    output::field("Source", &ctx.origin);
    print_record(&record);
    Ok(())
}

async fn refresh(args: RefreshArgs, ctx: &Context) -> Result<()> {
    let record = ctx
        .credentials
        .ensure_valid()
        .await
        .context("Failed to refresh access token")?;

    output::success("Access token is valid");
    print_record(&record);

    if let Some(path) = &args.write {
        write_record(&record, path)?;
        output::success(&format!("Credential written to {}", path.display()));
    }

    Ok(())
}

fn print_record(record: &CredentialRecord) {
    let now = Utc::now();
    let state = match record.state(now) {
        CredentialState::Valid => "valid".green(),
        CredentialState::Expired => "expired (refreshable)".yellow(),
        CredentialState::Invalid => "expired (no refresh token)".red(),
    };

    output::field("State", &state.to_string());
    output::field("Client ID", record.client_id());
    output::field("Token URI", record.token_uri().as_str());
    output::field("Scopes", &record.scopes().to_string());
    output::field(
        "Refresh token",
        if record.has_refresh_token() {
            "present"
        } else {
            "absent"
        },
    );

    let expiry = match record.expiry() {
        Some(expiry) if expiry > now => {
            format!("{} (in {} min)", expiry.to_rfc3339(), (expiry - now).num_minutes())
        }
        Some(expiry) => expiry.to_rfc3339(),
        None => "none".to_string(),
    };
    output::field("Expiry", &expiry);
}

/// Write the credential with owner-only permissions.
fn write_record(record: &CredentialRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&record.to_authorized_user_json())?;

    if path.exists() {
        warn!(path = %path.display(), "Overwriting existing credential file");
    }

    fs::write(path, &json)
        .with_context(|| format!("Failed to write credential to {}", path.display()))?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
