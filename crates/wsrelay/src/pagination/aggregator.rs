//! Cursor-following aggregation over a page-fetch function.

use std::future::Future;

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::error::AggregationError;

use super::page::{AggregateOptions, Page, PageCursor};

/// Fetch every page of a listing and return all items in upstream order.
///
/// `fetch_page` is called first with no cursor, then with each page's
/// `next` cursor, one call at a time, until a page comes back without one.
///
/// # Errors
///
/// Returns an [`AggregationError`] when:
///
/// - `fetch_page` fails; the error carries the items gathered so far.
/// - the listing still has pages after `options.max_pages` calls; the error
///   carries the items of exactly those pages.
/// - a single call takes longer than `options.page_timeout`; the error
///   carries no items.
///
/// # Example
///
/// ```
/// use wsrelay::{AggregateOptions, Page, PageCursor, collect_all};
///
/// # async fn example() {
/// let items = collect_all(
///     |cursor: Option<PageCursor>| async move {
///         Ok::<_, wsrelay::Error>(match cursor {
///             None => Page::new(vec![1, 2], Some("p2".into())),
///             Some(_) => Page::last(vec![3]),
///         })
///     },
///     AggregateOptions::default(),
/// )
/// .await
/// .unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// # }
/// ```
#[instrument(skip_all, fields(max_pages = options.max_pages))]
pub async fn collect_all<T, F, Fut>(
    mut fetch_page: F,
    options: AggregateOptions,
) -> std::result::Result<Vec<T>, AggregationError<T>>
where
    F: FnMut(Option<PageCursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<PageCursor> = None;
    let mut pages = 0;

    loop {
        if pages == options.max_pages {
            warn!(
                pages,
                items = items.len(),
                "Page limit reached with more results pending"
            );
            return Err(AggregationError::page_limit(options.max_pages, items));
        }
        pages += 1;

        let requested = cursor.clone();
        let fetch = fetch_page(cursor.take());
        let page = match tokio::time::timeout(options.page_timeout, fetch).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                warn!(page = pages, error = %e, "Page fetch failed");
                return Err(AggregationError::fetch(pages, e, items));
            }
            Err(_) => {
                warn!(page = pages, timeout = ?options.page_timeout, "Page fetch timed out");
                return Err(AggregationError::timeout(pages, options.page_timeout));
            }
        };

        debug!(page = pages, count = page.items.len(), "Fetched page");
        items.extend(page.items);

        match page.next {
            None => {
                debug!(pages, total = items.len(), "Listing complete");
                return Ok(items);
            }
            Some(next) => {
                if requested.as_ref() == Some(&next) {
                    warn!(page = pages, "Upstream repeated its page cursor");
                }
                cursor = Some(next);
            }
        }
    }
}
