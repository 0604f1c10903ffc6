//! The OAuth credential record and its expiry state machine.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthRefreshError, ConfigurationError};
use crate::types::{ScopeSet, ServiceUrl};

use super::refresh::{RefreshRequest, RefreshedToken, TokenRefresher};
use super::tokens::{AccessToken, ClientSecret, RefreshToken};

/// Lifetime assumed for a refreshed token when the endpoint omits
/// `expires_in`. Google issues one-hour access tokens.
const DEFAULT_TOKEN_LIFETIME: TimeDelta = TimeDelta::seconds(3600);

/// Where a credential record stands, as far as a local clock can tell.
///
/// A record starts out unvalidated; [`CredentialRecord::state`] places it in
/// one of these states with no network traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// The access token can be used as is.
    Valid,
    /// The access token is expired but a refresh token is available.
    Expired,
    /// The access token is expired and cannot be refreshed.
    Invalid,
}

/// An OAuth2 authorized-user credential.
///
/// Built once from the secret payload and afterwards changed only by a
/// successful refresh, which replaces the access token and expiry (and the
/// refresh token, if the endpoint rotates it). A failed refresh leaves the
/// record untouched.
///
/// A payload without an access token yields a record whose access token is
/// empty; such a record always counts as expired.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    token_uri: ServiceUrl,
    client_id: String,
    client_secret: ClientSecret,
    scopes: ScopeSet,
    expiry: Option<DateTime<Utc>>,
}

/// The authorized-user JSON shape, as written by installed-app flows.
/// Unknown fields such as `universe_domain` or `account` are ignored.
#[derive(Debug, Deserialize)]
struct AuthorizedUser {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    scopes: Option<ScopeSet>,
    #[serde(default)]
    expiry: Option<String>,
}

impl CredentialRecord {
    /// Create a record with no access token. It is expired until refreshed.
    pub fn new(
        token_uri: ServiceUrl,
        client_id: impl Into<String>,
        client_secret: ClientSecret,
        scopes: ScopeSet,
    ) -> Self {
        Self {
            access_token: AccessToken::new(""),
            refresh_token: None,
            token_uri,
            client_id: client_id.into(),
            client_secret,
            scopes,
            expiry: None,
        }
    }

    /// Set the access token and its expiry.
    pub fn with_access_token(
        mut self,
        access_token: AccessToken,
        expiry: Option<DateTime<Utc>>,
    ) -> Self {
        self.access_token = access_token;
        self.expiry = expiry;
        self
    }

    /// Set the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: RefreshToken) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    /// Parse an authorized-user JSON payload.
    ///
    /// `origin` names where the payload came from and only appears in error
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the payload is not a JSON object,
    /// lacks `token_uri`, `client_id`, `client_secret` or `scopes`, or has an
    /// unusable token endpoint or expiry.
    pub fn from_json(payload: &str, origin: &str) -> Result<Self, ConfigurationError> {
        let user: AuthorizedUser =
            serde_json::from_str(payload).map_err(|e| ConfigurationError::Malformed {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;

        let token_uri = required(user.token_uri, "token_uri")?;
        let token_uri = ServiceUrl::parse(&token_uri).map_err(|reason| {
            ConfigurationError::InvalidTokenUri {
                value: token_uri.clone(),
                reason,
            }
        })?;
        let client_id = required(user.client_id, "client_id")?;
        let client_secret = ClientSecret::new(required(user.client_secret, "client_secret")?);
        let scopes = user
            .scopes
            .ok_or(ConfigurationError::MissingField { field: "scopes" })?;
        let expiry = user.expiry.as_deref().map(parse_expiry).transpose()?;

        Ok(Self {
            access_token: AccessToken::new(user.token.unwrap_or_default()),
            refresh_token: user
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(RefreshToken::new),
            token_uri,
            client_id,
            client_secret,
            scopes,
            expiry,
        })
    }

    /// Render the record in the authorized-user JSON shape it was loaded
    /// from, so an external store can persist a refreshed credential.
    ///
    /// # Security
    ///
    /// The output contains every secret in the record.
    pub fn to_authorized_user_json(&self) -> serde_json::Value {
        let mut value = json!({
            "token": self.access_token.as_str(),
            "token_uri": self.token_uri.as_str(),
            "client_id": self.client_id,
            "client_secret": self.client_secret.as_str(),
            "scopes": self.scopes,
        });
        if let Some(refresh_token) = &self.refresh_token {
            value["refresh_token"] = json!(refresh_token.as_str());
        }
        if let Some(expiry) = self.expiry {
            value["expiry"] = json!(expiry.to_rfc3339_opts(SecondsFormat::Micros, true));
        }
        value
    }

    /// Returns the access token. Empty if the payload carried none.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn token_uri(&self) -> &ServiceUrl {
        &self.token_uri
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Whether the access token is unusable at `now`.
    ///
    /// A token with no expiry never expires locally; a missing token is
    /// always expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.as_str().is_empty() {
            return true;
        }
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// Whether the access token is unusable right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Classify the record at `now` without touching the network.
    pub fn state(&self, now: DateTime<Utc>) -> CredentialState {
        if !self.is_expired_at(now) {
            CredentialState::Valid
        } else if self.refresh_token.is_some() {
            CredentialState::Expired
        } else {
            CredentialState::Invalid
        }
    }

    /// Make sure the access token is usable, refreshing it if expired.
    ///
    /// A valid record is returned unchanged without a network call. An
    /// expired record with a refresh token is refreshed with exactly one
    /// call to `refresher`; the new token and expiry are applied only if
    /// that call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthRefreshError::NoRefreshToken`] for an expired record
    /// that cannot be refreshed, or the refresher's error if the refresh
    /// fails. Neither is worth retrying without outside intervention.
    #[instrument(skip_all, fields(client_id = %self.client_id))]
    pub async fn ensure_valid<R>(&mut self, refresher: &R) -> Result<&Self, AuthRefreshError>
    where
        R: TokenRefresher + ?Sized,
    {
        match self.state(Utc::now()) {
            CredentialState::Valid => {
                debug!("Access token still valid");
                return Ok(self);
            }
            CredentialState::Invalid => return Err(AuthRefreshError::NoRefreshToken),
            CredentialState::Expired => {}
        }

        let refreshed = {
            let Some(refresh_token) = self.refresh_token.as_ref() else {
                return Err(AuthRefreshError::NoRefreshToken);
            };
            refresher
                .refresh(RefreshRequest {
                    token_uri: &self.token_uri,
                    client_id: &self.client_id,
                    client_secret: &self.client_secret,
                    refresh_token,
                })
                .await?
        };

        self.apply_refresh(refreshed, Utc::now());
        info!(expiry = ?self.expiry, "Access token refreshed");
        Ok(self)
    }

    fn apply_refresh(&mut self, refreshed: RefreshedToken, now: DateTime<Utc>) {
        let lifetime = match refreshed.expires_in {
            Some(secs) => i64::try_from(secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX),
            None => {
                warn!(
                    lifetime_secs = DEFAULT_TOKEN_LIFETIME.num_seconds(),
                    "Token response has no expires_in, assuming the default lifetime"
                );
                DEFAULT_TOKEN_LIFETIME
            }
        };
        self.access_token = refreshed.access_token;
        self.expiry = now.checked_add_signed(lifetime);
        if let Some(rotated) = refreshed.refresh_token {
            self.refresh_token = Some(rotated);
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigurationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigurationError::MissingField { field })
}

/// Accepts RFC 3339, or a naive timestamp taken as UTC (the form Google's
/// Python tooling writes).
fn parse_expiry(value: &str) -> Result<DateTime<Utc>, ConfigurationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ConfigurationError::InvalidExpiry {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
