//! Credential lifecycle: loading, expiry checks, and refresh.
//!
//! The flow is: [`load`] a [`CredentialRecord`] from a [`SecretSource`],
//! hand it to a [`CredentialManager`], and call
//! [`CredentialManager::ensure_valid`] before each use.

mod manager;
mod record;
mod refresh;
mod secret;
mod tokens;

pub use manager::CredentialManager;
pub use record::{CredentialRecord, CredentialState};
pub use refresh::{HttpTokenRefresher, RefreshRequest, RefreshedToken, TokenRefresher};
pub use secret::{EnvSecretSource, LoadedCredential, MapSecretSource, SecretNames, SecretSource, load};
pub use tokens::{AccessToken, ClientSecret, RefreshToken};
