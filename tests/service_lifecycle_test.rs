//! Startup behaviour: probes while storage comes up, retries and exhaustion

mod support;

use anyhow::Result;
use assessor_storage::testing::{InMemoryRecordStore, ScriptedConnector};
use assessor_storage::ConnectionState;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use support::{fast_retry_config, TestServer};

#[tokio::test]
async fn test_readiness_flips_after_transient_connection_failures() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    let connector = Arc::new(ScriptedConnector::new(store, 3));
    let server = TestServer::start(fast_retry_config(10, 200), connector.clone()).await?;
    let client = Client::new();

    // Listener is up before storage
    let response = client.get(server.url("/readyz")).send().await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "not ready");
    assert_eq!(body["error"], "DB not connected");

    let response = client.get(server.url("/healthz")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(server.url("/api/data")).send().await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    assert!(server.wait_until_connected(Duration::from_secs(5)).await);
    assert_eq!(connector.attempts(), 4);

    let response = client.get(server.url("/readyz")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "ready");

    let response = client.get(server.url("/api/data")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    server.shutdown().await
}

#[tokio::test]
async fn test_exhausted_retries_leave_service_degraded() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    let connector = Arc::new(
        ScriptedConnector::new(store.clone(), u32::MAX).with_message("connection refused"),
    );
    let server = TestServer::start(fast_retry_config(3, 20), connector.clone()).await?;
    let client = Client::new();

    for _ in 0..100 {
        if server.storage.state() == ConnectionState::Failed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.storage.state(), ConnectionState::Failed);
    assert_eq!(connector.attempts(), 3);

    let response = client.get(server.url("/healthz")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(server.url("/readyz")).send().await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    for path in ["/api/data", "/api/stats"] {
        let response = client.get(server.url(path)).send().await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await?;
        assert_eq!(body["message"], "DB not connected");
    }
    assert!(store.is_empty());

    server.shutdown().await
}

#[tokio::test]
async fn test_every_response_carries_request_id() -> Result<()> {
    let connector = Arc::new(ScriptedConnector::new(Arc::new(InMemoryRecordStore::new()), 0));
    let server = TestServer::start(fast_retry_config(1, 10), connector).await?;
    let client = Client::new();

    let response = client
        .get(server.url("/healthz"))
        .header("X-Request-ID", "trace-me")
        .send()
        .await?;
    assert_eq!(response.headers()["x-request-id"], "trace-me");

    let response = client.get(server.url("/no-such-route")).send().await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));

    server.shutdown().await
}
