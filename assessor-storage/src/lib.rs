//! Storage layer for the assessor service
//!
//! Handlers never talk to a database driver directly. They go through a
//! [`StorageHandle`], which exposes the shared [`RecordStore`] only once the
//! background [`ConnectionLifecycle`] has established it.

pub mod connector;
pub mod error;
pub mod lifecycle;
pub mod payload;
pub mod record;
pub mod store;

#[cfg(feature = "mongo")]
pub mod mongo;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export core types for convenience
pub use connector::StoreConnector;
pub use error::{StorageError, StorageResult};
pub use lifecycle::{
    ConnectionEvent, ConnectionLifecycle, ConnectionObserver, ConnectionState, StorageHandle,
    TracingObserver,
};
pub use payload::random_payload;
pub use record::{Record, WRITE_RECORD_TYPE};
pub use store::RecordStore;

#[cfg(feature = "mongo")]
pub use mongo::{MongoConnector, MongoRecordStore};
