//! Subcommand implementations.

pub mod auth;
pub mod calendar;
pub mod contacts;
pub mod drive;
pub mod gmail;
pub mod tasks;

use anyhow::{Context as _, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;
use wsrelay::ListResult;

use crate::output;

/// Print a finished listing.
///
/// A listing that stopped early still prints whatever it gathered, then
/// fails so the process exits non-zero.
pub(crate) fn print_listing(result: ListResult, what: &str, pretty: bool) -> Result<()> {
    let err = match result {
        Ok(items) => {
            output::items(&items, pretty)?;
            output::success(&format!("{} {}", items.len(), what));
            return Ok(());
        }
        Err(err) => err,
    };

    if let Some(stopped) = err.as_aggregation() {
        output::items(stopped.partial(), pretty)?;
        if stopped.has_partial() {
            warn!(
                pages = stopped.pages_fetched(),
                items = stopped.partial().len(),
                "Printing partial listing"
            );
            output::warning(&format!(
                "listing incomplete after {} pages; printed {} {}",
                stopped.pages_fetched(),
                stopped.partial().len(),
                what
            ));
        }
    }

    let stage = err.stage();
    Err(anyhow::Error::new(err).context(format!("Failed to list {} ({} stage)", what, stage)))
}

/// Validate an RFC 3339 timestamp argument, normalized to UTC.
pub(crate) fn rfc3339(value: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid RFC 3339 timestamp '{}'", value))?;
    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_normalizes_to_utc() {
        assert_eq!(
            rfc3339("2025-03-01T09:00:00+01:00").unwrap(),
            "2025-03-01T08:00:00Z"
        );
        assert!(rfc3339("next tuesday").is_err());
    }
}
