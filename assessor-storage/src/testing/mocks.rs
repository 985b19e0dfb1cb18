//! Mock implementations of the storage traits using mockall

use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

use crate::{Record, RecordStore, StorageResult, StoreConnector};

mock! {
    pub Store {}

    #[async_trait]
    impl RecordStore for Store {
        async fn insert(&self, record: &Record) -> StorageResult<String>;
        async fn find_one_by_type(&self, kind: &str) -> StorageResult<Option<String>>;
        async fn count(&self) -> StorageResult<u64>;
        async fn ping(&self) -> StorageResult<()>;
        fn backend_name(&self) -> &'static str;
    }
}

mock! {
    pub Connector {}

    #[async_trait]
    impl StoreConnector for Connector {
        async fn connect(&self) -> StorageResult<Arc<dyn RecordStore>>;
        fn describe(&self) -> String;
    }
}
