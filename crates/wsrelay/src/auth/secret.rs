//! Loading the credential secret from an external key-value source.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::ConfigurationError;

use super::record::CredentialRecord;

/// A key-value store holding secret payloads, such as the process
/// environment.
pub trait SecretSource {
    /// Returns the value stored under `name`, if any.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory secret source.
#[derive(Debug, Clone, Default)]
pub struct MapSecretSource(HashMap<String, String>);

impl MapSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSecretSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl SecretSource for MapSecretSource {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// The names the credential secret is looked up under, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretNames {
    primary: String,
    fallback: Option<String>,
}

impl SecretNames {
    /// Default primary secret name.
    pub const PRIMARY: &'static str = "GOOGLE_TOKEN";
    /// Default fallback secret name.
    pub const FALLBACK: &'static str = "RAILWAY_TOKEN_JSON";

    pub fn new(primary: impl Into<String>, fallback: Option<String>) -> Self {
        Self {
            primary: primary.into(),
            fallback,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallback.as_deref())
    }
}

impl Default for SecretNames {
    fn default() -> Self {
        Self::new(Self::PRIMARY, Some(Self::FALLBACK.to_string()))
    }
}

/// A credential record and the secret name it was read from.
#[derive(Debug, Clone)]
pub struct LoadedCredential {
    pub record: CredentialRecord,
    pub origin: String,
}

/// Load the credential record from `source`.
///
/// Tries the primary name, then the fallback. A name holding only
/// whitespace counts as absent. Logs the name used and the granted scopes,
/// never the secret values.
///
/// # Errors
///
/// Returns [`ConfigurationError::Missing`] if no name holds a value, or the
/// parse error from [`CredentialRecord::from_json`].
pub fn load<S>(source: &S, names: &SecretNames) -> Result<LoadedCredential, ConfigurationError>
where
    S: SecretSource + ?Sized,
{
    let found = names.iter().find_map(|name| {
        let value = source.get(name).filter(|v| !v.trim().is_empty());
        if value.is_none() {
            debug!(name, "Secret not set");
        }
        value.map(|v| (name, v))
    });

    let Some((origin, payload)) = found else {
        return Err(ConfigurationError::Missing {
            names: names.iter().map(str::to_string).collect(),
        });
    };

    let record = CredentialRecord::from_json(&payload, origin)?;

    info!(
        origin,
        scopes = %record.scopes(),
        has_refresh_token = record.has_refresh_token(),
        has_expiry = record.expiry().is_some(),
        "Loaded credential secret"
    );

    Ok(LoadedCredential {
        record,
        origin: origin.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"token": "t1", "refresh_token": "r1",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "c", "client_secret": "s", "scopes": ["a"]}"#;

    #[test]
    fn primary_wins_over_fallback() {
        let source: MapSecretSource = [
            ("GOOGLE_TOKEN", PAYLOAD),
            ("RAILWAY_TOKEN_JSON", "not json"),
        ]
        .into_iter()
        .collect();

        let loaded = load(&source, &SecretNames::default()).unwrap();
        assert_eq!(loaded.origin, "GOOGLE_TOKEN");
    }

    #[test]
    fn falls_back_when_primary_is_blank() {
        let source: MapSecretSource = [("GOOGLE_TOKEN", "  "), ("RAILWAY_TOKEN_JSON", PAYLOAD)]
            .into_iter()
            .collect();

        let loaded = load(&source, &SecretNames::default()).unwrap();
        assert_eq!(loaded.origin, "RAILWAY_TOKEN_JSON");
        assert_eq!(loaded.record.client_id(), "c");
    }

    #[test]
    fn missing_everywhere_names_both_sources() {
        let err = load(&MapSecretSource::new(), &SecretNames::default()).unwrap_err();
        match err {
            ConfigurationError::Missing { names } => {
                assert_eq!(names, vec!["GOOGLE_TOKEN", "RAILWAY_TOKEN_JSON"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_payload_names_origin() {
        let source: MapSecretSource = [("CUSTOM", "{")].into_iter().collect();
        let names = SecretNames::new("CUSTOM", None);

        let err = load(&source, &names).unwrap_err();
        assert!(err.to_string().contains("'CUSTOM'"));
    }
}
