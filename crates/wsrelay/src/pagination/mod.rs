//! Cursor-based pagination across list APIs.

mod aggregator;
mod page;

pub use aggregator::collect_all;
pub use page::{AggregateOptions, Page, PageCursor};
