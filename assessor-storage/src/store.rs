//! Record store interface

use async_trait::async_trait;

use crate::{Record, StorageResult};

/// Operations the HTTP handlers need from the document store.
///
/// One instance is shared by every request; implementations must be safe
/// for concurrent use without external locking.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, returning the generated identifier as a string
    async fn insert(&self, record: &Record) -> StorageResult<String>;

    /// Identifier of any one record whose `type` equals `kind`
    async fn find_one_by_type(&self, kind: &str) -> StorageResult<Option<String>>;

    /// Total number of records in the collection
    async fn count(&self) -> StorageResult<u64>;

    /// Lightweight health command against the backend
    async fn ping(&self) -> StorageResult<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
