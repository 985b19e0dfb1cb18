//! Connection establishment

use async_trait::async_trait;
use std::sync::Arc;

use crate::{RecordStore, StorageResult};

/// Makes one attempt at producing a usable store.
///
/// Retrying is the caller's job; see [`crate::ConnectionLifecycle`].
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Attempt to connect and verify the backend answers
    async fn connect(&self) -> StorageResult<Arc<dyn RecordStore>>;

    /// Target description for logs, without credentials
    fn describe(&self) -> String;
}
