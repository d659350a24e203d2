//! Exercises the client against an in-process stub of the engine.

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use apportal_appredict::api::{ApPredictApi, CallError, LaunchError};
use apportal_appredict::commands::ResultCommand;

/// Serve a stub router on an ephemeral port.
async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> ApPredictApi {
    ApPredictApi::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

fn collection_route(router: Router, command: &str, body: Value) -> Router {
    let path = format!("/api/collection/{{call_id}}/{command}");
    router.route(&path, get(move || async move { Json(body.clone()) }))
}

#[tokio::test]
async fn launch_returns_call_id() {
    let router = Router::new().route(
        "/",
        post(|Json(_body): Json<Value>| async {
            Json(json!({"success": {"id": "11a66c9f-52b0-4b4c-8daf-c9d4f38d7ac6"}}))
        }),
    );
    let api = client(serve(router).await);

    let call_id = api.launch(&json!({"pacingFrequency": 1.0})).await.unwrap();
    assert_eq!(call_id, "11a66c9f-52b0-4b4c-8daf-c9d4f38d7ac6");
}

#[tokio::test]
async fn launch_surfaces_error_envelope() {
    let router = Router::new().route(
        "/",
        post(|| async { Json(json!({"error": "some error message"})) }),
    );
    let api = client(serve(router).await);

    let err = api.launch(&json!({})).await.unwrap_err();
    assert!(matches!(err, LaunchError::Api(_)));
    assert_eq!(err.to_string(), "API error message: some error message");
}

#[tokio::test]
async fn launch_rejects_invalid_json_body() {
    let router = Router::new().route("/", post(|| async { "this is not json" }));
    let api = client(serve(router).await);

    let err = api.launch(&json!({})).await.unwrap_err();
    assert!(matches!(err, LaunchError::InvalidJson));
    assert_eq!(
        err.to_string(),
        "Starting simulation failed: returned invalid JSON."
    );
}

#[tokio::test]
async fn launch_rejects_missing_id() {
    let router = Router::new().route("/", post(|| async { Json(json!({"success": {}})) }));
    let api = client(serve(router).await);

    let err = api.launch(&json!({})).await.unwrap_err();
    assert!(matches!(err, LaunchError::MissingId));
    assert_eq!(
        err.to_string(),
        "Starting simulation failed: no simulation id returned."
    );
}

#[tokio::test]
async fn launch_reports_connection_failure() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApPredictApi::new(format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    let err = api.launch(&json!({})).await.unwrap_err();
    assert!(matches!(err, LaunchError::Connection(_)));
    assert!(err.to_string().starts_with("API connection failed: "));
    assert!(err.to_string().ends_with('.'));
}

#[tokio::test]
async fn launch_rejects_invalid_endpoint() {
    let api = ApPredictApi::new("not a url".to_string(), Duration::from_secs(1)).unwrap();
    let err = api.launch(&json!({})).await.unwrap_err();
    assert!(matches!(err, LaunchError::InvalidUrl(_)));
    assert_eq!(err.to_string(), "Invalid URL: not a url.");
}

#[tokio::test]
async fn progress_takes_last_non_empty_label() {
    let router = collection_route(
        Router::new(),
        "progress_status",
        json!({"success": ["Initialising..", "5% completed", ""]}),
    );
    let api = client(serve(router).await);

    let label = api.progress_status("abc").await.unwrap();
    assert_eq!(label.as_deref(), Some("5% completed"));
}

#[tokio::test]
async fn progress_without_labels_is_none() {
    let router = collection_route(Router::new(), "progress_status", json!({"success": []}));
    let api = client(serve(router).await);

    assert_eq!(api.progress_status("abc").await.unwrap(), None);
}

#[tokio::test]
async fn stop_reports_confirmation() {
    let confirmed = collection_route(Router::new(), "STOP", json!({"success": true}));
    let api = client(serve(confirmed).await);
    assert!(api.stop("abc").await.unwrap());

    let refused = collection_route(Router::new(), "STOP", json!({"success": false}));
    let api = client(serve(refused).await);
    assert!(!api.stop("abc").await.unwrap());
}

#[tokio::test]
async fn fetch_returns_validated_payload() {
    let payload = json!([
        {"name": "Control", "series": [{"name": 0.0, "value": -85.2}]}
    ]);
    let router = collection_route(
        Router::new(),
        "voltage_traces",
        json!({"success": payload.clone()}),
    );
    let api = client(serve(router).await);

    let fetched = api
        .fetch_result("abc", ResultCommand::VoltageTraces)
        .await
        .unwrap();
    assert_eq!(fetched, Some(payload));
}

#[tokio::test]
async fn fetch_without_success_key_is_unavailable() {
    let router = collection_route(Router::new(), "messages", json!({}));
    let api = client(serve(router).await);

    let fetched = api.fetch_result("abc", ResultCommand::Messages).await.unwrap();
    assert_eq!(fetched, None);
}

#[tokio::test]
async fn fetch_rejects_schema_violation() {
    let router = collection_route(
        Router::new(),
        "messages",
        json!({"success": "some other response"}),
    );
    let api = client(serve(router).await);

    let err = api
        .fetch_result("abc", ResultCommand::Messages)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Schema { .. }));
    assert_eq!(
        err.to_string(),
        r#"Result to call messages failed JSON validation: "some other response" is not of type 'array'"#
    );
}

#[tokio::test]
async fn fetch_rejects_invalid_json_body() {
    let router = Router::new().route(
        "/api/collection/{call_id}/messages",
        get(|| async { "no json here" }),
    );
    let api = client(serve(router).await);

    let err = api
        .fetch_result("abc", ResultCommand::Messages)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "API call: messages returned invalid JSON."
    );
}

#[tokio::test]
async fn fetch_reports_connection_failure_with_command() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApPredictApi::new(format!("http://{addr}"), Duration::from_secs(1)).unwrap();
    let err = api
        .fetch_result("abc", ResultCommand::Messages)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("API connection failed for call: messages: "));
}

#[tokio::test]
async fn call_surfaces_error_envelope() {
    let router = collection_route(
        Router::new(),
        "q_net",
        json!({"error": "no such simulation"}),
    );
    let api = client(serve(router).await);

    let err = api.fetch_result("abc", ResultCommand::QNet).await.unwrap_err();
    assert_eq!(err.to_string(), "API error message: no such simulation");
}
