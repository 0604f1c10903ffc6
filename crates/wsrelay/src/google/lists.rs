//! List operations for each supported Google API.
//!
//! Each listing comes in two forms: `*_page` fetches one page at a cursor,
//! and the plain form checks the credential once and then follows cursors
//! through [`collect_all`](crate::collect_all).

use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::Result;
use crate::pagination::{AggregateOptions, Page, PageCursor};

use super::client::GoogleClient;
use super::endpoints::{
    ConnectionsQuery, EventsQuery, FilesQuery, SearchContactsQuery, TaskListsQuery, TasksQuery,
    ThreadsQuery,
};

/// Result of a full listing.
///
/// A credential that cannot be refreshed fails with
/// [`Error::AuthRefresh`](crate::Error::AuthRefresh) before any page is
/// fetched. A listing that stops early fails with
/// [`Error::Aggregation`](crate::Error::Aggregation), which carries the
/// items gathered so far.
pub type ListResult = Result<Vec<Value>>;

impl GoogleClient {
    // ========================================================================
    // Calendar
    // ========================================================================

    fn events_url(&self, query: &EventsQuery) -> Url {
        self.endpoints()
            .calendar
            .endpoint(["calendars", query.calendar_id.as_str(), "events"])
    }

    /// One page of `calendars/{calendarId}/events`.
    pub async fn calendar_events_page(
        &self,
        query: &EventsQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>> {
        self.list_page(self.events_url(query), query, "items", cursor)
            .await
    }

    /// Every event matching `query`.
    #[instrument(skip(self, query), fields(calendar_id = %query.calendar_id))]
    pub async fn calendar_events(&self, query: &EventsQuery, options: AggregateOptions) -> ListResult {
        self.list_all(self.events_url(query), query, "items", options)
            .await
    }

    // ========================================================================
    // Gmail
    // ========================================================================

    fn threads_url(&self, query: &ThreadsQuery) -> Url {
        self.endpoints()
            .gmail
            .endpoint(["users", query.user_id.as_str(), "threads"])
    }

    /// One page of `users/{userId}/threads`.
    pub async fn gmail_threads_page(
        &self,
        query: &ThreadsQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>> {
        self.list_page(self.threads_url(query), query, "threads", cursor)
            .await
    }

    /// Every thread matching `query`. Threads carry ids and snippets only.
    #[instrument(skip(self, query))]
    pub async fn gmail_threads(&self, query: &ThreadsQuery, options: AggregateOptions) -> ListResult {
        self.list_all(self.threads_url(query), query, "threads", options)
            .await
    }

    // ========================================================================
    // Drive
    // ========================================================================

    /// One page of `files`.
    pub async fn drive_files_page(
        &self,
        query: &FilesQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>> {
        let url = self.endpoints().drive.endpoint(["files"]);
        self.list_page(url, query, "files", cursor).await
    }

    #[instrument(skip(self, query))]
    pub async fn drive_files(&self, query: &FilesQuery, options: AggregateOptions) -> ListResult {
        let url = self.endpoints().drive.endpoint(["files"]);
        self.list_all(url, query, "files", options).await
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// One page of `users/@me/lists`.
    pub async fn task_lists_page(
        &self,
        query: &TaskListsQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>> {
        let url = self.endpoints().tasks.endpoint(["users", "@me", "lists"]);
        self.list_page(url, query, "items", cursor).await
    }

    #[instrument(skip(self, query))]
    pub async fn task_lists(&self, query: &TaskListsQuery, options: AggregateOptions) -> ListResult {
        let url = self.endpoints().tasks.endpoint(["users", "@me", "lists"]);
        self.list_all(url, query, "items", options).await
    }

    fn tasks_url(&self, query: &TasksQuery) -> Url {
        self.endpoints()
            .tasks
            .endpoint(["lists", query.tasklist.as_str(), "tasks"])
    }

    /// One page of `lists/{tasklist}/tasks`.
    pub async fn tasks_page(&self, query: &TasksQuery, cursor: Option<PageCursor>) -> Result<Page<Value>> {
        self.list_page(self.tasks_url(query), query, "items", cursor)
            .await
    }

    #[instrument(skip(self, query), fields(tasklist = %query.tasklist))]
    pub async fn tasks(&self, query: &TasksQuery, options: AggregateOptions) -> ListResult {
        self.list_all(self.tasks_url(query), query, "items", options)
            .await
    }

    // ========================================================================
    // People
    // ========================================================================

    /// One page of `people/me/connections`.
    pub async fn contacts_page(
        &self,
        query: &ConnectionsQuery,
        cursor: Option<PageCursor>,
    ) -> Result<Page<Value>> {
        let url = self.endpoints().people.endpoint(["people", "me", "connections"]);
        self.list_page(url, query, "connections", cursor).await
    }

    #[instrument(skip(self, query))]
    pub async fn contacts(&self, query: &ConnectionsQuery, options: AggregateOptions) -> ListResult {
        let url = self.endpoints().people.endpoint(["people", "me", "connections"]);
        self.list_all(url, query, "connections", options).await
    }

    /// Search the user's contacts. Single request; the API does not page
    /// search results.
    #[instrument(skip(self, query))]
    pub async fn search_contacts(&self, query: &SearchContactsQuery) -> Result<Vec<Value>> {
        let url = self.endpoints().people.endpoint(["people:searchContacts"]);
        let page = self.list_page(url, query, "results", None).await?;
        Ok(page.items)
    }
}
