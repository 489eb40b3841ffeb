use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use folio_api_integration::harness::TestServer;
use folio_api_integration::{ada, memory_state, submission_from, CountingNotifier, FailingNotifier};
use folio_common::ContactRecord;
use folio_server::{AppState, Dispatcher, MemoryStore};

/// The canonical example round trip.
#[tokio::test]
async fn ada_submission_is_stored_and_echoed() {
    let server = TestServer::start(memory_state()).await;

    let (status, body) = server.submit(&ada()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let contact = &body["contact"];
    assert!(!contact["id"].is_null());
    assert_eq!(contact["name"], "Ada Lovelace");
    assert_eq!(contact["email"], "ada@example.com");
    assert_eq!(contact["company"], "");
    assert_eq!(contact["message"], "Interested in your work.");
    assert!(contact["createdAt"]
        .as_str()
        .is_some_and(|ts| chrono::DateTime::parse_from_rfc3339(ts).is_ok()));
}

/// Submitting the same payload twice gives two records that differ only in id/timestamp.
#[tokio::test]
async fn duplicate_submissions_get_distinct_ids() {
    let server = TestServer::start(memory_state()).await;

    let (_, first) = server.submit(&submission_from("Grace Hopper")).await;
    let (_, second) = server.submit(&submission_from("Grace Hopper")).await;

    let first: ContactRecord = serde_json::from_value(first["contact"].clone()).unwrap();
    let second: ContactRecord = serde_json::from_value(second["contact"].clone()).unwrap();
    assert_ne!(first.id, second.id);
    assert!(first.same_content(&second));
    assert_eq!(first.company.as_deref(), Some("Grace Hopper & Co"));
}

/// Missing or blank required fields are rejected and nothing is stored.
#[tokio::test]
async fn incomplete_submissions_create_nothing() {
    let server = TestServer::start(memory_state()).await;
    server.submit(&ada()).await;
    let before = server.contacts(None).await.len();

    for field in ["name", "email", "message"] {
        let mut missing = ada();
        missing.as_object_mut().unwrap().remove(field);
        let (status, body) = server.submit(&missing).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0]["path"], json!([field]));

        let mut blank = ada();
        blank[field] = json!("");
        let (status, body) = server.submit(&blank).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "blank {field}");
        assert_eq!(body["errors"][0]["code"], "too_small");
    }

    assert_eq!(server.contacts(None).await.len(), before);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let server = TestServer::start(memory_state()).await;
    for email in [
        "not-an-email",
        "Ada <ada@example.com>",
        "ada@localhost",
        "ada@[127.0.0.1]",
    ] {
        let mut payload = ada();
        payload["email"] = json!(email);

        let (status, body) = server.submit(&payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{email}");
        assert_eq!(body["message"], "Invalid form data");
        assert_eq!(body["errors"][0]["code"], "invalid_email", "{email}");
    }
    assert!(server.contacts(None).await.is_empty());
}

#[tokio::test]
async fn garbage_bodies_are_validation_failures() {
    let server = TestServer::start(memory_state()).await;

    let (status, body) = server.submit_raw("this is not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["code"], "invalid_json");

    let (status, body) = server.submit(&json!(["an", "array"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["path"], json!([]));
}

/// A notifier that always fails must not change the outcome.
#[tokio::test]
async fn failing_notification_still_succeeds() {
    let failing = FailingNotifier::default();
    let counting = CountingNotifier::default();
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Dispatcher::default().with(failing.clone()).with(counting.clone()),
    );
    let server = TestServer::start(state).await;

    let (status, body) = server.submit(&ada()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(failing.calls(), 1);
    assert_eq!(counting.calls(), 1);
    assert_eq!(server.contacts(None).await.len(), 1);
}

/// Rejected submissions never reach the notifiers.
#[tokio::test]
async fn rejected_submission_is_not_notified() {
    let counting = CountingNotifier::default();
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Dispatcher::default().with(counting.clone()),
    );
    let server = TestServer::start(state).await;

    let (status, _) = server.submit(&json!({ "name": "Ada" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn resume_descriptor_is_served() {
    let server = TestServer::start(memory_state()).await;
    let (status, body) = server.get("/api/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["downloadUrl"].as_str().is_some_and(|u| u.starts_with("https://")));
    assert_ne!(body["message"], Value::Null);
}
