//! Google API base URLs and list request/response types.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::ServiceUrl;

// ============================================================================
// Service Roots
// ============================================================================

/// Google Calendar API v3
pub const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Gmail API v1
pub const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1";

/// Google Drive API v3
pub const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

/// Google Tasks API v1
pub const TASKS_API: &str = "https://tasks.googleapis.com/tasks/v1";

/// People API v1 (Contacts)
pub const PEOPLE_API: &str = "https://people.googleapis.com/v1";

/// Base URL of each Google API the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub calendar: ServiceUrl,
    pub gmail: ServiceUrl,
    pub drive: ServiceUrl,
    pub tasks: ServiceUrl,
    pub people: ServiceUrl,
}

impl ApiEndpoints {
    /// The public Google endpoints.
    pub fn google() -> Self {
        Self {
            calendar: builtin(CALENDAR_API),
            gmail: builtin(GMAIL_API),
            drive: builtin(DRIVE_API),
            tasks: builtin(TASKS_API),
            people: builtin(PEOPLE_API),
        }
    }

    /// Route every API through one host, keeping each API's version path
    /// (`/calendar/v3`, `/gmail/v1`, `/drive/v3`, `/tasks/v1`, `/people/v1`).
    pub fn single_host(base: &ServiceUrl) -> Self {
        Self {
            calendar: base.join(["calendar", "v3"]),
            gmail: base.join(["gmail", "v1"]),
            drive: base.join(["drive", "v3"]),
            tasks: base.join(["tasks", "v1"]),
            people: base.join(["people", "v1"]),
        }
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self::google()
    }
}

fn builtin(url: &'static str) -> ServiceUrl {
    ServiceUrl::from_url(Url::parse(url).expect("built-in Google endpoint is a valid URL"))
}

// ============================================================================
// Query Types
// ============================================================================

/// Query for `events.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Calendar to list; `primary` is the user's main calendar.
    #[serde(skip)]
    pub calendar_id: String,
    /// Lower bound (RFC 3339) on event end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_min: Option<String>,
    /// Upper bound (RFC 3339) on event start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_max: Option<String>,
    pub single_events: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl Default for EventsQuery {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            time_min: None,
            time_max: None,
            single_events: true,
            order_by: Some("startTime".to_string()),
            max_results: None,
        }
    }
}

/// Query for `users.threads.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsQuery {
    #[serde(skip)]
    pub user_id: String,
    /// Gmail search expression, same syntax as the web UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_spam_trash: Option<bool>,
}

impl Default for ThreadsQuery {
    fn default() -> Self {
        Self {
            user_id: "me".to_string(),
            q: None,
            max_results: None,
            include_spam_trash: None,
        }
    }
}

/// Query for `files.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Partial-response mask. Must keep `nextPageToken`, or every listing
    /// ends after its first page.
    pub fields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

impl FilesQuery {
    pub const DEFAULT_FIELDS: &'static str = "nextPageToken, files(id, name)";
}

impl Default for FilesQuery {
    fn default() -> Self {
        Self {
            q: None,
            fields: Self::DEFAULT_FIELDS.to_string(),
            page_size: None,
            order_by: None,
        }
    }
}

/// Query for `tasklists.list`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Query for `tasks.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    /// Task list id; `@default` is the user's default list.
    #[serde(skip)]
    pub tasklist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_completed: Option<bool>,
    /// Lower bound (RFC 3339) on due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl Default for TasksQuery {
    fn default() -> Self {
        Self {
            tasklist: "@default".to_string(),
            show_completed: None,
            due_min: None,
            max_results: None,
        }
    }
}

/// Query for `people.connections.list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsQuery {
    pub person_fields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

impl Default for ConnectionsQuery {
    fn default() -> Self {
        Self {
            person_fields: DEFAULT_PERSON_FIELDS.to_string(),
            page_size: None,
            sort_order: None,
        }
    }
}

/// Query for `people.searchContacts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContactsQuery {
    pub query: String,
    pub read_mask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchContactsQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            read_mask: DEFAULT_PERSON_FIELDS.to_string(),
            page_size: None,
        }
    }
}

/// Person fields requested when the caller does not pick any.
pub const DEFAULT_PERSON_FIELDS: &str = "names,emailAddresses";

// ============================================================================
// Response Types
// ============================================================================

/// Any Google list response: one array of items under a resource-specific
/// key, plus an optional continuation token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Google API error response format.
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorResponse {
    pub error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_host_keeps_version_paths() {
        let base = ServiceUrl::new("http://127.0.0.1:9000").unwrap();
        let endpoints = ApiEndpoints::single_host(&base);
        assert_eq!(endpoints.gmail.as_str(), "http://127.0.0.1:9000/gmail/v1");
        assert_eq!(endpoints.people.as_str(), "http://127.0.0.1:9000/people/v1");
    }

    #[test]
    fn events_query_defaults_to_primary_in_start_order() {
        let query = EventsQuery::default();
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(query.calendar_id, "primary");
        assert_eq!(value["singleEvents"], true);
        assert_eq!(value["orderBy"], "startTime");
        assert!(value.get("calendarId").is_none());
        assert!(value.get("timeMin").is_none());
    }

    #[test]
    fn drive_fields_keep_page_token() {
        assert!(FilesQuery::default().fields.contains("nextPageToken"));
    }

    #[test]
    fn list_response_separates_token_from_items() {
        let response: ListResponse = serde_json::from_str(
            r#"{"kind": "drive#fileList", "nextPageToken": "n1", "files": [{"id": "1"}]}"#,
        )
        .unwrap();
        assert_eq!(response.next_page_token.as_deref(), Some("n1"));
        assert!(response.fields["files"].is_array());
    }
}
