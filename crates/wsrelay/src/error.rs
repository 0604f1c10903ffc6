//! Error types for the wsrelay library.
//!
//! Every failure names the stage it came from: configuration, authorization,
//! pagination, or a direct upstream call. See [`Error::stage`].

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The unified error type for wsrelay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The credential secret is missing or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// The access token could not be refreshed.
    #[error("authorization error: {0}")]
    AuthRefresh(#[from] AuthRefreshError),

    /// A paginated listing failed, hit its page cap, or timed out.
    #[error("pagination error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from a Google API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Returns the stage of the request flow that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Config(_) => Stage::Configuration,
            Error::AuthRefresh(_) => Stage::Authorization,
            Error::Aggregation(_) => Stage::Pagination,
            Error::Transport(_) | Error::Protocol(_) => Stage::Upstream,
        }
    }

    /// Returns the listing failure, if this error ended a paginated listing.
    pub fn as_aggregation(&self) -> Option<&AggregationError> {
        match self {
            Error::Aggregation(err) => Some(err),
            _ => None,
        }
    }
}

/// The stage of the request flow an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    Authorization,
    Pagination,
    Upstream,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Authorization => "authorization",
            Stage::Pagination => "pagination",
            Stage::Upstream => "upstream",
        };
        f.write_str(name)
    }
}

/// The credential secret could not be turned into a usable record.
///
/// Not retryable: the process should not serve requests until the
/// operator fixes the secret.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// None of the recognized secret names held a value.
    #[error("no credential secret found under {}", .names.join(" or "))]
    Missing { names: Vec<String> },

    /// The payload is not JSON of the expected shape.
    #[error("credential secret from '{origin}' is malformed: {reason}")]
    Malformed { origin: String, reason: String },

    /// A required field is absent or empty.
    #[error("credential secret is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The token endpoint is not a usable URL.
    #[error("invalid token endpoint '{value}': {reason}")]
    InvalidTokenUri { value: String, reason: String },

    /// The expiry timestamp could not be parsed.
    #[error("invalid expiry '{value}': {reason}")]
    InvalidExpiry { value: String, reason: String },

    /// A service base URL is not usable.
    #[error("invalid service URL '{value}': {reason}")]
    InvalidServiceUrl { value: String, reason: String },
}

/// A token refresh was needed and did not succeed.
///
/// Never retried by this library. Recovering requires a new refresh token
/// from a full authorization flow, or operator intervention.
#[derive(Debug, Clone, Error)]
pub enum AuthRefreshError {
    /// The access token is expired and there is no refresh token.
    #[error("access token expired and no refresh token is available")]
    NoRefreshToken,

    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {message}")]
    Transport { message: String },

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint rejected refresh with HTTP {status}{}", describe_rejection(.error, .description))]
    Rejected {
        status: u16,
        error: Option<String>,
        description: Option<String>,
    },

    /// The token endpoint answered 2xx with an unusable body.
    #[error("malformed token response: {reason}")]
    MalformedResponse { reason: String },
}

fn describe_rejection(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(error), Some(description)) => format!(" [{}]: {}", error, description),
        (Some(error), None) => format!(" [{}]", error),
        (None, Some(description)) => format!(": {}", description),
        (None, None) => String::new(),
    }
}

/// Why a paginated listing stopped early.
#[derive(Debug, Error)]
pub enum AggregationFailure {
    /// Fetching a page returned an error.
    #[error("fetching page {page} failed: {source}")]
    Fetch {
        page: usize,
        #[source]
        source: Box<Error>,
    },

    /// The upstream still had pages after `max_pages` calls.
    #[error("page limit of {max_pages} reached with more results pending")]
    PageLimit { max_pages: usize },

    /// A single page took longer than the page timeout.
    #[error("page {page} exceeded the {}ms page timeout", .timeout.as_millis())]
    Timeout { page: usize, timeout: Duration },
}

/// A paginated listing that did not run to completion.
///
/// Carries whatever items were accumulated before the failure, in upstream
/// order. A timeout discards them: [`AggregationError::partial`] is empty
/// for [`AggregationFailure::Timeout`].
#[derive(Debug)]
pub struct AggregationError<T = serde_json::Value> {
    failure: AggregationFailure,
    pages_fetched: usize,
    partial: Vec<T>,
}

impl<T> AggregationError<T> {
    pub(crate) fn fetch(page: usize, source: Error, partial: Vec<T>) -> Self {
        Self {
            failure: AggregationFailure::Fetch {
                page,
                source: Box::new(source),
            },
            pages_fetched: page - 1,
            partial,
        }
    }

    pub(crate) fn page_limit(max_pages: usize, partial: Vec<T>) -> Self {
        Self {
            failure: AggregationFailure::PageLimit { max_pages },
            pages_fetched: max_pages,
            partial,
        }
    }

    pub(crate) fn timeout(page: usize, timeout: Duration) -> Self {
        Self {
            failure: AggregationFailure::Timeout { page, timeout },
            pages_fetched: page - 1,
            partial: Vec::new(),
        }
    }

    /// Returns why the listing stopped.
    pub fn failure(&self) -> &AggregationFailure {
        &self.failure
    }

    /// Number of pages that completed successfully.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Items accumulated before the failure.
    pub fn partial(&self) -> &[T] {
        &self.partial
    }

    /// Whether any data survived the failure.
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    /// Consumes the error, returning the accumulated items.
    pub fn into_partial(self) -> Vec<T> {
        self.partial
    }

    /// Converts the carried items, keeping the failure.
    pub fn map_partial<U>(self, f: impl FnMut(T) -> U) -> AggregationError<U> {
        AggregationError {
            failure: self.failure,
            pages_fetched: self.pages_fetched,
            partial: self.partial.into_iter().map(f).collect(),
        }
    }
}

impl<T> fmt::Display for AggregationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.failure)?;
        if self.partial.is_empty() {
            write!(f, " (no data available)")
        } else {
            write!(f, " ({} items available)", self.partial.len())
        }
    }
}

impl<T: fmt::Debug> std::error::Error for AggregationError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be decoded.
    #[error("undecodable response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// A non-success response from a Google API.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Google status name (e.g. `PERMISSION_DENIED`), if present.
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if the upstream refused the access token.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.error.as_deref() == Some("UNAUTHENTICATED")
    }
}
