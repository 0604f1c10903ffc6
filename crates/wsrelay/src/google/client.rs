//! Authenticated HTTP client for Google REST APIs.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::Result;
use crate::auth::{AccessToken, CredentialManager};
use crate::error::{Error, ProtocolError, TransportError};
use crate::pagination::{AggregateOptions, Page, PageCursor, collect_all};

use super::endpoints::{ApiEndpoints, GoogleErrorResponse, ListResponse};

/// HTTP client for Google APIs.
///
/// Every request, or every full listing, first asks the
/// [`CredentialManager`] for a valid access token, refreshing it if needed,
/// and sends it as a bearer token. Requests are never retried.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    credentials: CredentialManager,
    endpoints: ApiEndpoints,
}

impl GoogleClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(credentials: CredentialManager, endpoints: ApiEndpoints) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wsrelay/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self::with_http_client(http, credentials, endpoints))
    }

    /// Create a client on top of an existing HTTP client.
    pub fn with_http_client(
        http: reqwest::Client,
        credentials: CredentialManager,
        endpoints: ApiEndpoints,
    ) -> Self {
        Self {
            http,
            credentials,
            endpoints,
        }
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Make an authenticated GET request.
    ///
    /// Validates the credential first, refreshing it if needed.
    pub async fn get_json<Q, R>(&self, url: Url, params: &Q, cursor: Option<&PageCursor>) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
        R: DeserializeOwned,
    {
        let token = self.credentials.access_token().await?;
        self.get_json_with(&token, url, params, cursor).await
    }

    /// Make a GET request with an already validated access token.
    #[instrument(skip_all, fields(url = %url))]
    async fn get_json_with<Q, R>(
        &self,
        token: &AccessToken,
        url: Url,
        params: &Q,
        cursor: Option<&PageCursor>,
    ) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
        R: DeserializeOwned,
    {
        debug!(paged = cursor.is_some(), "Google API request");
        trace!(?params, "query parameters");

        let mut request = self
            .http
            .get(url)
            .query(params)
            .bearer_auth(token.as_str())
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cursor) = cursor {
            request = request.query(&[("pageToken", cursor.as_str())]);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Fetch one page of a list endpoint, validating the credential first.
    pub(crate) async fn list_page<Q>(
        &self,
        url: Url,
        params: &Q,
        items_key: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
    {
        let token = self.credentials.access_token().await?;
        self.fetch_page(&token, url, params, items_key, cursor).await
    }

    /// Follow every page of a list endpoint.
    ///
    /// The credential is checked once, before the first page, so an
    /// authorization failure surfaces as [`Error::AuthRefresh`] and never
    /// counts against the page timeout.
    pub(crate) async fn list_all<Q>(
        &self,
        url: Url,
        params: &Q,
        items_key: &str,
        options: AggregateOptions,
    ) -> Result<Vec<Value>>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
    {
        let token = self.credentials.access_token().await?;
        let items = collect_all(
            |cursor| self.fetch_page(&token, url.clone(), params, items_key, cursor),
            options,
        )
        .await?;
        Ok(items)
    }

    /// Fetch one page whose items sit under `items_key`.
    ///
    /// Google omits the items key on empty pages; that reads as no items.
    async fn fetch_page<Q>(
        &self,
        token: &AccessToken,
        url: Url,
        params: &Q,
        items_key: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>>
    where
        Q: Serialize + std::fmt::Debug + ?Sized,
    {
        let mut response: ListResponse = self
            .get_json_with(token, url, params, cursor.as_ref())
            .await?;

        let items = match response.fields.remove(items_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(TransportError::Decode {
                    message: format!("expected '{}' to be an array, got {}", items_key, other),
                }
                .into());
            }
        };

        Ok(Page::new(items, response.next_page_token))
    }

    /// Handle a Google API response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "Google API response");

        if status.is_success() {
            let body = response.json::<R>().await?;
            Ok(body)
        } else {
            let error = self.parse_error_response(response).await;
            if error.is_auth_error() {
                warn!(%error, "Google API refused the access token");
            }
            Err(Error::Protocol(error))
        }
    }

    /// Parse a Google error body: `{"error": {"code", "message", "status"}}`.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<GoogleErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error.status, body.error.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
