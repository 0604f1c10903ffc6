//! Mock Google API tests.
//!
//! These tests route every API through one wiremock server and check the
//! requests the client sends and how it walks paginated listings.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wsrelay::{
    AggregateOptions, AggregationError, AggregationFailure, ApiEndpoints, AuthRefreshError,
    CredentialManager, CredentialRecord, Error, EventsQuery, FilesQuery, GoogleClient,
    HttpTokenRefresher, SearchContactsQuery, ServiceUrl, Stage, TaskListsQuery, TasksQuery,
    ThreadsQuery, TransportError,
};

fn mock_base(server: &MockServer) -> ServiceUrl {
    ServiceUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

/// A client whose credential and APIs both live on the mock server.
fn client_with_token(server: &MockServer, token: &str, expires_in: TimeDelta) -> GoogleClient {
    let payload = json!({
        "token": token,
        "refresh_token": "r1",
        "token_uri": format!("{}token", mock_base(server)),
        "client_id": "c",
        "client_secret": "s",
        "scopes": ["https://www.googleapis.com/auth/calendar.readonly"],
        "expiry": (Utc::now() + expires_in).to_rfc3339()
    })
    .to_string();
    let record = CredentialRecord::from_json(&payload, "test").unwrap();
    let credentials = CredentialManager::new(record, HttpTokenRefresher::new().unwrap());
    GoogleClient::new(credentials, ApiEndpoints::single_host(&mock_base(server))).unwrap()
}

fn client(server: &MockServer) -> GoogleClient {
    client_with_token(server, "t1", TimeDelta::hours(1))
}

/// The listing failure inside `err`, which must have ended a listing.
fn aggregation(err: &Error) -> &AggregationError {
    err.as_aggregation()
        .unwrap_or_else(|| panic!("expected a listing failure, got {err:?}"))
}

fn options(max_pages: usize) -> AggregateOptions {
    AggregateOptions::new(max_pages, Duration::from_secs(5))
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_calendar_events_follow_page_tokens() {
    let server = MockServer::start().await;
    let events_path = "/calendar/v3/calendars/primary/events";

    Mock::given(method("GET"))
        .and(path(events_path))
        .and(header("authorization", "Bearer t1"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#events",
            "items": [{"id": "e1"}, {"id": "e2"}],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(events_path))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#events",
            "items": [{"id": "e3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = client(&server)
        .calendar_events(&EventsQuery::default(), options(10))
        .await
        .unwrap();

    let ids: Vec<_> = events.iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["e1", "e2", "e3"]);
}

#[tokio::test]
async fn test_drive_files_request_page_token_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("fields", FilesQuery::DEFAULT_FIELDS))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "f1", "name": "notes.txt"}],
            "nextPageToken": "n2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "n2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "f2", "name": "plan.md"}]
        })))
        .mount(&server)
        .await;

    let files = client(&server)
        .drive_files(&FilesQuery::default(), options(10))
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["name"], "plan.md");
}

#[tokio::test]
async fn test_empty_listing_without_items_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gmail/v1/users/me/threads"))
        .and(query_param("q", "is:unread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultSizeEstimate": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ThreadsQuery {
        q: Some("is:unread".to_string()),
        ..Default::default()
    };
    let threads = client(&server).gmail_threads(&query, options(10)).await.unwrap();

    assert!(threads.is_empty());
}

#[tokio::test]
async fn test_repeating_page_token_hits_page_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/v1/users/@me/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "list"}],
            "nextPageToken": "same"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .task_lists(&TaskListsQuery::default(), options(3))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Pagination);
    let err = aggregation(&err);
    assert!(matches!(
        err.failure(),
        AggregationFailure::PageLimit { max_pages: 3 }
    ));
    assert_eq!(err.partial().len(), 3);
    assert!(err.to_string().contains("3 items available"));
}

#[tokio::test]
async fn test_tasks_in_named_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/v1/lists/work/tasks"))
        .and(query_param("showCompleted", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "t1", "title": "Ship it"}]
        })))
        .mount(&server)
        .await;

    let query = TasksQuery {
        tasklist: "work".to_string(),
        show_completed: Some(false),
        ..Default::default()
    };
    let tasks = client(&server).tasks(&query, options(10)).await.unwrap();

    assert_eq!(tasks[0]["title"], "Ship it");
}

// ============================================================================
// Error Tests
// ============================================================================

#[tokio::test]
async fn test_api_error_keeps_earlier_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/v1/people/me/connections"))
        .and(query_param("personFields", "names,emailAddresses"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connections": [{"resourceName": "people/1"}],
            "nextPageToken": "c2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/people/v1/people/me/connections"))
        .and(query_param("pageToken", "c2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .contacts(&Default::default(), options(10))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Pagination);
    let err = aggregation(&err);
    assert_eq!(err.partial().len(), 1);
    match err.failure() {
        AggregationFailure::Fetch { page, source } => {
            assert_eq!(*page, 2);
            assert_eq!(source.stage(), Stage::Upstream);
            match source.as_ref() {
                Error::Protocol(e) => {
                    assert_eq!(e.status, 403);
                    assert_eq!(e.error.as_deref(), Some("PERMISSION_DENIED"));
                    assert!(!e.is_auth_error());
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": 401,
                "message": "Request had invalid authentication credentials.",
                "status": "UNAUTHENTICATED"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .drive_files_page(&FilesQuery::default(), None)
        .await
        .unwrap_err();

    match err {
        Error::Protocol(e) => assert!(e.is_auth_error()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_items_of_wrong_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendar/v3/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": "not a list"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .calendar_events_page(&EventsQuery::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transport(TransportError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_failed_refresh_stops_before_api_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_with_token(&server, "t1", TimeDelta::hours(-1));
    let err = client
        .calendar_events(&EventsQuery::default(), options(10))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Authorization);
    assert!(err.as_aggregation().is_none());
    assert!(matches!(
        err,
        Error::AuthRefresh(AuthRefreshError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_missing_refresh_token_is_an_authorization_failure() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let payload = json!({
        "token": "t1",
        "token_uri": format!("{}token", mock_base(&server)),
        "client_id": "c",
        "client_secret": "s",
        "scopes": ["a"],
        "expiry": (Utc::now() - TimeDelta::hours(1)).to_rfc3339()
    })
    .to_string();
    let record = CredentialRecord::from_json(&payload, "test").unwrap();
    let credentials = CredentialManager::new(record, HttpTokenRefresher::new().unwrap());
    let client =
        GoogleClient::new(credentials, ApiEndpoints::single_host(&mock_base(&server))).unwrap();

    let err = client
        .gmail_threads(&ThreadsQuery::default(), options(10))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Authorization);
    assert!(matches!(
        err,
        Error::AuthRefresh(AuthRefreshError::NoRefreshToken)
    ));
}

#[tokio::test]
async fn test_slow_refresh_does_not_count_against_page_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "t2", "expires_in": 3600}))
                .set_delay(Duration::from_millis(1500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "f1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_token(&server, "t1", TimeDelta::hours(-1));
    let files = client
        .drive_files(
            &FilesQuery::default(),
            AggregateOptions::new(10, Duration::from_millis(500)),
        )
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
}

// ============================================================================
// Refresh-then-call Tests
// ============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_before_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "t2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/people/v1/people:searchContacts"))
        .and(header("authorization", "Bearer t2"))
        .and(query_param("query", "ada"))
        .and(query_param("readMask", "names,emailAddresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"person": {"names": [{"displayName": "Ada Lovelace"}]}}
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_with_token(&server, "t1", TimeDelta::minutes(-5));
    let query = SearchContactsQuery::new("ada");

    let results = client.search_contacts(&query).await.unwrap();
    assert_eq!(
        results[0]["person"]["names"][0]["displayName"],
        "Ada Lovelace"
    );

    // The refreshed token is reused for the next call.
    client.search_contacts(&query).await.unwrap();
}
