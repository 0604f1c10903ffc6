//! Google REST API access.
//!
//! [`GoogleClient`] authenticates every request through a
//! [`CredentialManager`](crate::CredentialManager) and exposes the list
//! endpoints of Calendar, Gmail, Drive, Tasks and People.

mod client;
mod endpoints;
mod lists;

pub use client::GoogleClient;
pub use endpoints::{
    ApiEndpoints, CALENDAR_API, ConnectionsQuery, DEFAULT_PERSON_FIELDS, DRIVE_API, EventsQuery,
    FilesQuery, GMAIL_API, PEOPLE_API, SearchContactsQuery, TASKS_API, TaskListsQuery, TasksQuery,
    ThreadsQuery,
};
pub use lists::ListResult;
