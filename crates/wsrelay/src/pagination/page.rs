//! Page and cursor types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An opaque continuation token from a paged list API.
///
/// Never empty: an empty token from the upstream means "no more pages" and
/// is normalized away by [`PageCursor::new`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wrap a continuation token, treating an empty one as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The token as sent back in the `pageToken` query parameter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// The items on this page, in upstream order.
    pub items: Vec<T>,

    /// Cursor for the next page, if more items exist.
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    /// Build a page from the raw upstream continuation token.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items,
            next: next_token.and_then(PageCursor::new),
        }
    }

    /// The final page of a listing.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Whether this page ends the listing.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Bounds on one aggregation run.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wsrelay::AggregateOptions;
///
/// let options = AggregateOptions::default()
///     .with_max_pages(5)
///     .with_page_timeout(Duration::from_secs(10));
/// assert_eq!(options.max_pages, 5);
/// assert_eq!(options, AggregateOptions::new(5, Duration::from_secs(10)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Maximum number of page fetches before giving up with more pending.
    pub max_pages: usize,

    /// Maximum duration of a single page fetch.
    pub page_timeout: Duration,
}

impl AggregateOptions {
    /// Page cap used by [`AggregateOptions::default`].
    pub const DEFAULT_MAX_PAGES: usize = 50;
    /// Per-page timeout used by [`AggregateOptions::default`].
    pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Options with an explicit page cap and per-page timeout.
    ///
    /// A `max_pages` of zero makes every listing fail before its first call.
    pub fn new(max_pages: usize, page_timeout: Duration) -> Self {
        Self {
            max_pages,
            page_timeout,
        }
    }

    /// Replace the page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Replace the per-page timeout.
    pub fn with_page_timeout(mut self, page_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_PAGES, Self::DEFAULT_PAGE_TIMEOUT)
    }
}
