//! Granted OAuth scope set.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of OAuth scopes a credential was granted.
///
/// Authorized-user payloads carry scopes either as a JSON array or as one
/// space-separated string; both deserialize to the same set. Scopes are
/// kept sorted so diagnostics are stable.
///
/// # Example
///
/// ```
/// use wsrelay::ScopeSet;
///
/// let scopes: ScopeSet = serde_json::from_str(
///     r#""https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/tasks""#,
/// ).unwrap();
/// assert_eq!(scopes.len(), 2);
/// assert!(scopes.contains("https://www.googleapis.com/auth/tasks"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    /// Create an empty scope set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `scope` was granted. Matching is exact.
    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    /// Add a scope, returning whether it was new. Blank scopes are ignored.
    pub fn insert(&mut self, scope: impl Into<String>) -> bool {
        let scope = scope.into();
        if scope.trim().is_empty() {
            return false;
        }
        self.0.insert(scope)
    }

    /// Number of distinct scopes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no scopes were granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        )
    }
}

// Space-separated, the OAuth wire form.
impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ScopeSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for ScopeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Joined(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(scopes) => scopes.into_iter().collect(),
            Repr::Joined(scopes) => scopes.split_whitespace().collect(),
        })
    }
}
