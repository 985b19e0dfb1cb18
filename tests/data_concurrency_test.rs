//! Concurrent data requests against a shared store

mod support;

use anyhow::Result;
use assessor_storage::testing::{InMemoryRecordStore, ScriptedConnector};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use support::{fast_retry_config, TestServer};

#[tokio::test]
async fn test_ten_concurrent_data_requests_add_fifty_documents() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    let connector = Arc::new(ScriptedConnector::new(store.clone(), 0));
    let server = TestServer::start(fast_retry_config(1, 10), connector).await?;
    assert!(server.wait_until_connected(Duration::from_secs(2)).await);

    let client = Client::new();
    let before: Value = client.get(server.url("/api/stats")).send().await?.json().await?;
    assert_eq!(before["total_documents"], 0);

    let requests = (0..10).map(|_| {
        let client = client.clone();
        let url = server.url("/api/data");
        async move {
            let response = client.get(url).send().await?;
            let status = response.status();
            let body: Value = response.json().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
    });

    let mut all_writes = HashSet::new();
    for result in join_all(requests).await {
        let (status, body) = result?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let writes = body["writes"].as_array().expect("writes array");
        let reads = body["reads"].as_array().expect("reads array");
        assert_eq!(writes.len(), 5);
        assert_eq!(reads.len(), 5);
        for id in writes {
            assert!(all_writes.insert(id.as_str().expect("write id").to_string()));
        }
        // Every request wrote before reading, so a write record always exists
        assert!(reads.iter().all(|id| id.is_string()));
    }
    assert_eq!(all_writes.len(), 50);

    let after: Value = client.get(server.url("/api/stats")).send().await?.json().await?;
    assert_eq!(after["total_documents"], 50);
    assert_eq!(store.len(), 50);

    server.shutdown().await
}

#[tokio::test]
async fn test_storage_failure_mid_request_is_reported_verbatim() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    let connector = Arc::new(ScriptedConnector::new(store.clone(), 0));
    let server = TestServer::start(fast_retry_config(1, 10), connector).await?;
    assert!(server.wait_until_connected(Duration::from_secs(2)).await);

    store.fail_after_operations(2, "WriteConflict: operation was interrupted");

    let response = Client::new().get(server.url("/api/data")).send().await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "WriteConflict: operation was interrupted");

    // Committed inserts are not rolled back
    assert_eq!(store.len(), 2);

    server.shutdown().await
}
