//! MongoDB backend

use assessor_config::DatabaseConfig;
use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::sync::Arc;

use crate::{Record, RecordStore, StorageResult, StoreConnector};

/// Connects to MongoDB using the service's database configuration
pub struct MongoConnector {
    config: DatabaseConfig,
}

impl MongoConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self) -> StorageResult<Arc<dyn RecordStore>> {
        let mut options = ClientOptions::parse(&self.config.uri).await?;
        options.server_selection_timeout = Some(self.config.server_selection_timeout);
        options.connect_timeout = Some(self.config.connect_timeout);
        options.app_name.get_or_insert_with(|| "assessor".to_string());

        // Client construction is lazy; the ping forces server selection.
        let client = Client::with_options(options)?;
        let store = MongoRecordStore::new(
            client,
            &self.config.resolved_database_name(),
            &self.config.collection,
        );
        store.ping().await?;

        Ok(Arc::new(store))
    }

    fn describe(&self) -> String {
        redact_uri(&self.config.uri)
    }
}

/// Record store backed by a single MongoDB collection
pub struct MongoRecordStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoRecordStore {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection::<Document>(collection);
        Self { client, collection }
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn insert(&self, record: &Record) -> StorageResult<String> {
        let document = doc! {
            "type": record.kind.as_str(),
            "index": record.index,
            "payload": record.payload.as_str(),
            "timestamp": mongodb::bson::DateTime::from_millis(record.timestamp.timestamp_millis()),
        };

        let result = self.collection.insert_one(document).await?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn find_one_by_type(&self, kind: &str) -> StorageResult<Option<String>> {
        let found = self
            .collection
            .find_one(doc! { "type": kind })
            .projection(doc! { "_id": 1 })
            .await?;

        Ok(found.and_then(|document| document.get("_id").map(id_to_string)))
    }

    async fn count(&self) -> StorageResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.client.database("admin").run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

/// Stringify a document id the way the shell prints it: bare hex for ObjectIds
fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strip `user:password@` from a connection string
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };

    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***@{}", scheme, &rest[at + 1..]),
        None => uri.to_string(),
    }
}
