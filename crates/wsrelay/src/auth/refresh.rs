//! The OAuth2 refresh-token grant.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{AuthRefreshError, Error};
use crate::types::ServiceUrl;

use super::tokens::{AccessToken, ClientSecret, RefreshToken};

/// Inputs to one refresh-token exchange.
#[derive(Debug, Clone, Copy)]
pub struct RefreshRequest<'a> {
    pub token_uri: &'a ServiceUrl,
    pub client_id: &'a str,
    pub client_secret: &'a ClientSecret,
    pub refresh_token: &'a RefreshToken,
}

/// A successful refresh-token exchange.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: AccessToken,
    /// Lifetime of the new access token in seconds, if the endpoint said.
    pub expires_in: Option<u64>,
    /// A rotated refresh token, if the endpoint issued one.
    pub refresh_token: Option<RefreshToken>,
}

/// Performs the refresh-token grant against a token endpoint.
///
/// One call to [`TokenRefresher::refresh`] is exactly one round-trip.
/// Implementations must not retry.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(
        &self,
        request: RefreshRequest<'_>,
    ) -> Result<RefreshedToken, AuthRefreshError>;
}

/// Form body of the refresh-token grant.
#[derive(serde::Serialize)]
struct RefreshForm<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

/// Successful token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// OAuth2 error response body.
#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// [`TokenRefresher`] over HTTP, posting a form to the record's token
/// endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    client: reqwest::Client,
}

impl HttpTokenRefresher {
    /// Timeout applied to the whole exchange by [`HttpTokenRefresher::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a refresher with its own HTTP client.
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wsrelay/", env!("CARGO_PKG_VERSION")))
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Create a refresher on top of an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(skip_all, fields(token_uri = %request.token_uri))]
    async fn refresh(
        &self,
        request: RefreshRequest<'_>,
    ) -> Result<RefreshedToken, AuthRefreshError> {
        debug!("Requesting new access token");

        let form = RefreshForm {
            grant_type: "refresh_token",
            client_id: request.client_id,
            client_secret: request.client_secret.as_str(),
            refresh_token: request.refresh_token.as_str(),
        };

        let response = self
            .client
            .post(request.token_uri.as_url().clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthRefreshError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthRefreshError::Transport {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            // Try to parse as OAuth2 error format
            let parsed = serde_json::from_str::<TokenErrorResponse>(&body).ok();
            let (error, description) = parsed
                .map(|p| (p.error, p.error_description))
                .unwrap_or_default();
            warn!(status = status.as_u16(), error = ?error, "Token endpoint rejected refresh");
            return Err(AuthRefreshError::Rejected {
                status: status.as_u16(),
                error,
                description,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthRefreshError::MalformedResponse {
                reason: e.to_string(),
            })?;

        let access_token = parsed.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AuthRefreshError::MalformedResponse {
                reason: "response has no access_token".to_string(),
            }
        })?;

        debug!(
            expires_in = ?parsed.expires_in,
            rotated = parsed.refresh_token.is_some(),
            "Token endpoint issued new access token"
        );

        Ok(RefreshedToken {
            access_token: AccessToken::new(access_token),
            expires_in: parsed.expires_in,
            refresh_token: parsed
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(RefreshToken::new),
        })
    }
}
