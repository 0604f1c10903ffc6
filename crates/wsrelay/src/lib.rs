//! wsrelay - Google Workspace access with self-refreshing OAuth credentials
//!
//! This library keeps an OAuth2 "authorized user" credential valid for the
//! lifetime of a process and aggregates paginated Google API listings.
//! Every authenticated call flows through a [`CredentialManager`], which
//! refreshes the access token on demand, at most once at a time.
//!
//! # Example
//!
//! ```no_run
//! use wsrelay::{
//!     AggregateOptions, ApiEndpoints, CredentialManager, EnvSecretSource, EventsQuery,
//!     GoogleClient, SecretNames,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = CredentialManager::from_source(&EnvSecretSource, &SecretNames::default())?;
//! let client = GoogleClient::new(credentials, ApiEndpoints::google())?;
//!
//! let events = client
//!     .calendar_events(&EventsQuery::default(), AggregateOptions::default())
//!     .await?;
//!
//! for event in events {
//!     println!("{}", event["summary"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod google;
pub mod pagination;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, ClientSecret, CredentialManager, CredentialRecord, CredentialState,
    EnvSecretSource, HttpTokenRefresher, LoadedCredential, MapSecretSource, RefreshRequest,
    RefreshToken, RefreshedToken, SecretNames, SecretSource, TokenRefresher, load,
};
pub use error::{
    AggregationError, AggregationFailure, AuthRefreshError, ConfigurationError, Error,
    ProtocolError, Stage, TransportError,
};
pub use google::{
    ApiEndpoints, ConnectionsQuery, EventsQuery, FilesQuery, GoogleClient, ListResult,
    SearchContactsQuery, TaskListsQuery, TasksQuery, ThreadsQuery,
};
pub use pagination::{AggregateOptions, Page, PageCursor, collect_all};
pub use types::{ScopeSet, ServiceUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
