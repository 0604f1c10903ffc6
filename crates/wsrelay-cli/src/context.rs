//! Credential and client setup shared by every command.

use std::fs;
use std::time::Duration;

use anyhow::{Context as _, Result};
use wsrelay::{
    AggregateOptions, ApiEndpoints, CredentialManager, CredentialRecord, EnvSecretSource,
    GoogleClient, HttpTokenRefresher, SecretNames, ServiceUrl,
};

use crate::cli::ConfigArgs;

/// Everything a command needs to talk to Google.
pub struct Context {
    /// Where the credential was read from: a secret name or a file path.
    pub origin: String,
    pub credentials: CredentialManager,
    pub endpoints: ApiEndpoints,
    pub options: AggregateOptions,
}

impl Context {
    pub fn from_args(args: &ConfigArgs) -> Result<Self> {
        let (record, origin) = match &args.token_file {
            Some(path) => {
                let payload = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read token file {}", path.display()))?;
                let origin = path.display().to_string();
                let record = CredentialRecord::from_json(&payload, &origin)
                    .context("Invalid token file")?;
                (record, origin)
            }
            None => {
                let names = SecretNames::new(
                    args.secret_name.clone(),
                    Some(args.fallback_secret_name.clone()),
                );
                let loaded = wsrelay::load(&EnvSecretSource, &names)
                    .context("Failed to load credential secret")?;
                (loaded.record, loaded.origin)
            }
        };

        let refresher = HttpTokenRefresher::new().context("Failed to create HTTP client")?;
        let credentials = CredentialManager::new(record, refresher);

        let endpoints = match &args.api_base {
            Some(base) => {
                let base = ServiceUrl::new(base).context("Invalid API base URL")?;
                ApiEndpoints::single_host(&base)
            }
            None => ApiEndpoints::google(),
        };

        let options = AggregateOptions::new(args.max_pages, Duration::from_secs(args.page_timeout));

        Ok(Self {
            origin,
            credentials,
            endpoints,
            options,
        })
    }

    /// Build an API client sharing this context's credential.
    pub fn client(&self) -> Result<GoogleClient> {
        GoogleClient::new(self.credentials.clone(), self.endpoints.clone())
            .context("Failed to create HTTP client")
    }
}
