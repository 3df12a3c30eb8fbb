//! Library integration tests against an in-process stub extraction service
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::{Value, json};
use tempfile::TempDir;
use urlsum_core::*;

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn ok_service() -> Router {
    Router::new().route(
        "/api/extract",
        post(|axum::Json(body): axum::Json<Value>| async move {
            axum::Json(json!({
                "title": "Example",
                "summary": "A simple page",
                "keyPoints": ["one"],
                "url": body["url"],
            }))
        }),
    )
}

fn failing_service(status: StatusCode, body: &'static str) -> Router {
    Router::new().route("/api/extract", post(move || async move { (status, body).into_response() }))
}

fn session_for(base_url: &str) -> Session<ExtractClient> {
    let config = ClientConfig { base_url: base_url.to_string(), ..Default::default() };
    let client = ExtractClient::new(&config).unwrap();
    Session::new(client, RecordStore::new(), PersistMode::ReadOnly)
}

#[tokio::test]
async fn test_success_response_becomes_head_record() {
    let base = spawn_service(ok_service()).await;
    let mut session = session_for(&base);

    let record = session.handle_extract("https://example.com").await.clone();

    assert_eq!(record.title, "Example");
    assert_eq!(record.summary, "A simple page");
    assert_eq!(record.key_points, vec!["one".to_string()]);
    assert_eq!(record.url, "https://example.com");
    assert_eq!(record.status, Status::Success);
    assert_eq!(session.store().head(), Some(&record));
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let base = spawn_service(ok_service()).await;
    let mut session = session_for(&format!("{}/", base));

    let record = session.handle_extract("https://example.com").await;
    assert_eq!(record.status, Status::Success);
}

#[tokio::test]
async fn test_server_error_message_surfaces_in_record() {
    let base = spawn_service(failing_service(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"fetch failed"}"#)).await;
    let mut session = session_for(&base);

    let record = session.handle_extract("https://example.com").await.clone();

    assert_eq!(record.title, "Error");
    assert_eq!(record.summary, "fetch failed");
    assert_eq!(record.error.as_deref(), Some("fetch failed"));
    assert!(record.key_points.is_empty());
    assert_eq!(record.url, "https://example.com");
}

#[tokio::test]
async fn test_error_without_json_body_uses_default_message() {
    let base = spawn_service(failing_service(StatusCode::BAD_GATEWAY, "upstream exploded")).await;
    let mut session = session_for(&base);

    let record = session.handle_extract("https://example.com").await;
    assert_eq!(record.summary, "Failed to extract content");
}

#[tokio::test]
async fn test_client_reports_service_status() {
    let base = spawn_service(failing_service(StatusCode::NOT_FOUND, r#"{"error":"no such page"}"#)).await;
    let client = ExtractClient::new(&ClientConfig { base_url: base, ..Default::default() }).unwrap();

    let err = client.extract("https://example.com/missing").await.unwrap_err();
    assert!(matches!(err, UrlsumError::Service { status: 404, ref message } if message == "no such page"));
}

#[tokio::test]
async fn test_malformed_success_body_becomes_error_record() {
    let router = Router::new().route(
        "/api/extract",
        post(|| async { axum::Json(json!({ "title": "Example", "summary": 42 })) }),
    );
    let base = spawn_service(router).await;
    let mut session = session_for(&base);

    let record = session.handle_extract("https://example.com").await;
    assert_eq!(record.status, Status::Error);
    assert!(record.summary.starts_with("Unexpected response from extraction service"));
}

#[tokio::test]
async fn test_unreachable_service_becomes_error_record() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = session_for(&format!("http://{}", addr));
    let record = session.handle_extract("https://example.com").await;

    assert_eq!(record.status, Status::Error);
    assert!(record.summary.starts_with("HTTP request failed"));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_configured_timeout() {
    let router = Router::new().route(
        "/api/extract",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let base = spawn_service(router).await;
    let config = ClientConfig { base_url: base, timeout: Some(1), ..Default::default() };
    let client = ExtractClient::new(&config).unwrap();

    let err = client.extract("https://example.com").await.unwrap_err();
    assert!(matches!(err, UrlsumError::Timeout { timeout: 1 }));
}

#[tokio::test]
async fn test_form_to_store_round_trip() {
    let base = spawn_service(ok_service()).await;
    let tmp = TempDir::new().unwrap();
    let storage = LocalStorage::new(tmp.path());

    let client = ExtractClient::new(&ClientConfig { base_url: base.clone(), ..Default::default() }).unwrap();
    let mut session = Session::new(client, RecordStore::restore(storage.clone()), PersistMode::OnWrite);
    let mut form = SubmissionForm::new();

    form.set_input("https://example.com");
    assert!(matches!(form.submit(&mut session).await, FormOutcome::Submitted(_)));
    form.set_input("not a url");
    assert!(matches!(form.submit(&mut session).await, FormOutcome::Rejected(ValidationError::Invalid)));
    assert_eq!(session.store().len(), 1);

    let restored = RecordStore::restore(storage);
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.head().unwrap().title, "Example");

    let table = TableState::new();
    let rows = table.apply(restored.records());
    assert_eq!(rows.len(), 1);
    assert_eq!(table.empty_state(restored.records(), rows.len()), None);
}
