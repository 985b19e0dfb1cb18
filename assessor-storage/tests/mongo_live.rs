//! Exercises the MongoDB backend against a real server.
//!
//! Run with
//! `MONGO_URI=mongodb://localhost:27017/assessmentdb cargo test -p assessor-storage -- --ignored`

use assessor_config::DatabaseConfig;
use assessor_storage::{MongoConnector, Record, StoreConnector, WRITE_RECORD_TYPE};

#[tokio::test]
#[ignore = "requires a running MongoDB; set MONGO_URI"]
async fn test_mongo_round_trip() {
    let uri = std::env::var("MONGO_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/assessmentdb".to_string());
    let config = DatabaseConfig {
        uri,
        collection: format!("records_test_{}", std::process::id()),
        ..DatabaseConfig::default()
    };

    let store = MongoConnector::new(config).connect().await.expect("connect");
    store.ping().await.expect("ping");

    let before = store.count().await.expect("count");
    let id = store.insert(&Record::write(0, "abcd".to_string())).await.expect("insert");
    assert_eq!(id.len(), 24);

    let found = store.find_one_by_type(WRITE_RECORD_TYPE).await.expect("find");
    assert!(found.is_some());
    assert_eq!(store.count().await.expect("count"), before + 1);
    assert_eq!(store.find_one_by_type("absent").await.expect("find"), None);
}
