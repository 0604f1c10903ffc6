//! Service URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigurationError;

/// A validated base URL for a remote service: a token endpoint or a Google
/// API root such as `https://www.googleapis.com/calendar/v3`.
///
/// The URL must be absolute and use HTTPS. Plain HTTP is accepted only for
/// loopback hosts so local fakes can stand in for Google.
///
/// # Example
///
/// ```
/// use wsrelay::ServiceUrl;
///
/// let calendar = ServiceUrl::new("https://www.googleapis.com/calendar/v3").unwrap();
/// assert_eq!(
///     calendar.endpoint(["calendars", "primary", "events"]).as_str(),
///     "https://www.googleapis.com/calendar/v3/calendars/primary/events"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidServiceUrl`] if the URL is not
    /// absolute, has no host, or uses plain HTTP for a non-loopback host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ConfigurationError> {
        let s = s.as_ref();
        Self::parse(s).map_err(|reason| ConfigurationError::InvalidServiceUrl {
            value: s.to_string(),
            reason,
        })
    }

    pub(crate) fn parse(s: &str) -> Result<Self, String> {
        let url = Url::parse(s).map_err(|e| e.to_string())?;
        Self::validate(&url)?;
        Ok(Self(url))
    }

    /// Returns the URL of a resource below this base, one path segment per
    /// item. Segments are percent-encoded, so ids containing `#` or `/` are
    /// safe to pass through.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.0.clone();
        // Validation guarantees the URL can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// A sub-base below this one, e.g. an API version root.
    pub(crate) fn join<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Self {
        Self(self.endpoint(segments))
    }

    /// Wrap a URL known to be valid, such as a built-in constant.
    pub(crate) fn from_url(url: Url) -> Self {
        Self(url)
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Whether this URL points at the local machine.
    pub fn is_loopback(&self) -> bool {
        Self::loopback_host(&self.0)
    }

    fn loopback_host(url: &Url) -> bool {
        url.host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]")
    }

    fn validate(url: &Url) -> Result<(), String> {
        if url.cannot_be_a_base() {
            return Err("must be an absolute URL".to_string());
        }

        if url.host_str().is_none() {
            return Err("must have a host".to_string());
        }

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && Self::loopback_host(url)) {
            return Err("must use HTTPS (HTTP allowed only for localhost)".to_string());
        }

        Ok(())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceUrl {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let url = ServiceUrl::new("https://oauth2.googleapis.com/token").unwrap();
        assert_eq!(url.host(), Some("oauth2.googleapis.com"));
        assert!(!url.is_loopback());
    }

    #[test]
    fn valid_localhost_http() {
        let url = ServiceUrl::new("http://127.0.0.1:8080").unwrap();
        assert!(url.is_loopback());
    }

    #[test]
    fn endpoint_appends_segments() {
        let base = ServiceUrl::new("https://tasks.googleapis.com/tasks/v1/").unwrap();
        assert_eq!(
            base.endpoint(["users", "@me", "lists"]).as_str(),
            "https://tasks.googleapis.com/tasks/v1/users/@me/lists"
        );
    }

    #[test]
    fn endpoint_encodes_calendar_ids() {
        let base = ServiceUrl::new("https://www.googleapis.com/calendar/v3").unwrap();
        let url = base.endpoint(["calendars", "en.usa#holiday@group.v.calendar.google.com"]);
        assert_eq!(
            url.path(),
            "/calendar/v3/calendars/en.usa%23holiday@group.v.calendar.google.com"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        let err = ServiceUrl::new("http://oauth2.googleapis.com/token").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidServiceUrl { .. }));
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ServiceUrl::new("/token").is_err());
    }
}
