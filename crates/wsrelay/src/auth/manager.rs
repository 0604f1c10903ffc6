//! Shared ownership of the process-wide credential.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::{AuthRefreshError, Error};

use super::record::{CredentialRecord, CredentialState};
use super::refresh::{HttpTokenRefresher, TokenRefresher};
use super::secret::{self, SecretNames, SecretSource};
use super::tokens::AccessToken;

/// The process-wide credential, shared by every request handler.
///
/// Cheap to clone (it uses an internal `Arc`). The record sits behind an
/// async mutex that is held for the whole check-and-refresh step, so when
/// several callers find the token expired at once only the first refreshes.
/// The others wait and then share its outcome: the new token if it
/// succeeded, or the same error if it failed.
///
/// # Example
///
/// ```no_run
/// use wsrelay::{CredentialManager, EnvSecretSource, SecretNames};
///
/// # async fn example() -> Result<(), wsrelay::Error> {
/// let credentials = CredentialManager::from_source(&EnvSecretSource, &SecretNames::default())?;
/// let record = credentials.ensure_valid().await?;
/// println!("granted: {}", record.scopes());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CredentialManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    slot: Mutex<Slot>,
    /// Number of finished refresh attempts. Read before queueing on the lock.
    attempts: AtomicU64,
    refresher: Arc<dyn TokenRefresher>,
}

struct Slot {
    record: CredentialRecord,
    /// Outcome of the most recent attempt, if it failed.
    failure: Option<AuthRefreshError>,
}

impl CredentialManager {
    /// Take ownership of `record`, refreshing it through `refresher`.
    pub fn new(record: CredentialRecord, refresher: impl TokenRefresher + 'static) -> Self {
        Self::with_refresher(record, Arc::new(refresher))
    }

    /// Like [`CredentialManager::new`] with an already shared refresher.
    pub fn with_refresher(record: CredentialRecord, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                slot: Mutex::new(Slot {
                    record,
                    failure: None,
                }),
                attempts: AtomicU64::new(0),
                refresher,
            }),
        }
    }

    /// Load the record from a secret source and refresh it over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the secret is missing or malformed.
    pub fn from_source<S>(source: &S, names: &SecretNames) -> Result<Self, Error>
    where
        S: SecretSource + ?Sized,
    {
        let loaded = secret::load(source, names)?;
        Ok(Self::new(loaded.record, HttpTokenRefresher::new()?))
    }

    /// Return a usable copy of the credential, refreshing it first if it
    /// has expired.
    ///
    /// The shared record is updated in place on a successful refresh and
    /// left alone on failure. A caller that queued behind a refresh which
    /// then failed gets that failure instead of sending a refresh of its
    /// own; the next caller to arrive afterwards makes a fresh attempt. The
    /// lock is released on every exit path, including when the returned
    /// future is dropped mid-refresh.
    ///
    /// # Errors
    ///
    /// See [`CredentialRecord::ensure_valid`].
    #[instrument(skip(self))]
    pub async fn ensure_valid(&self) -> Result<CredentialRecord, AuthRefreshError> {
        let seen = self.inner.attempts.load(Ordering::SeqCst);
        let mut slot = self.inner.slot.lock().await;

        if self.inner.attempts.load(Ordering::SeqCst) != seen {
            if let Some(failure) = &slot.failure {
                debug!("Sharing the failure of a refresh that finished while waiting");
                return Err(failure.clone());
            }
        }

        let attempting = slot.record.state(Utc::now()) == CredentialState::Expired;
        let result = slot
            .record
            .ensure_valid(self.inner.refresher.as_ref())
            .await
            .map(|_| ());

        if attempting {
            slot.failure = result.as_ref().err().cloned();
            self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        }

        result?;
        Ok(slot.record.clone())
    }

    /// Return a usable access token, refreshing first if needed.
    pub async fn access_token(&self) -> Result<AccessToken, AuthRefreshError> {
        Ok(self.ensure_valid().await?.access_token().clone())
    }

    /// Return a copy of the credential as it stands, without validating it.
    pub async fn snapshot(&self) -> CredentialRecord {
        self.inner.slot.lock().await.record.clone()
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("record", &"[REDACTED]")
            .finish()
    }
}
