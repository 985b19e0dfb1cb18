//! In-process stand-ins for a real database

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    ConnectionEvent, ConnectionObserver, Record, RecordStore, StorageError, StorageResult,
    StoreConnector,
};

#[derive(Debug, Clone)]
enum FailureMode {
    None,
    /// Succeed for this many more operations, then fail with the message
    After(u64, String),
}

/// A `RecordStore` backed by a vector
///
/// Ids are 24 hex characters so they look like the ones a document database
/// hands out.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<(String, Record)>>,
    next_id: AtomicU64,
    failure: Mutex<FailureMode>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failure: Mutex::new(FailureMode::None),
        }
    }

    /// Let `operations` more operations through, then fail with `message`
    pub fn fail_after_operations(&self, operations: u64, message: impl Into<String>) {
        *self.failure.lock().unwrap() = FailureMode::After(operations, message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = FailureMode::None;
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of everything stored so far, in insertion order
    pub fn records(&self) -> Vec<(String, Record)> {
        self.records.lock().unwrap().clone()
    }

    fn check_failure(&self) -> StorageResult<()> {
        let mut failure = self.failure.lock().unwrap();
        match &mut *failure {
            FailureMode::None => Ok(()),
            FailureMode::After(remaining, message) => {
                if *remaining == 0 {
                    Err(StorageError::backend(message.clone()))
                } else {
                    *remaining -= 1;
                    Ok(())
                }
            }
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &Record) -> StorageResult<String> {
        self.check_failure()?;
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records.lock().unwrap().push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn find_one_by_type(&self, kind: &str) -> StorageResult<Option<String>> {
        self.check_failure()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|(_, r)| r.kind == kind).map(|(id, _)| id.clone()))
    }

    async fn count(&self) -> StorageResult<u64> {
        self.check_failure()?;
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn ping(&self) -> StorageResult<()> {
        self.check_failure()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Connector that fails its first `failures` attempts, then hands out `store`
pub struct ScriptedConnector {
    store: Arc<dyn RecordStore>,
    failures: u32,
    message: String,
    attempts: AtomicU32,
}

impl ScriptedConnector {
    pub fn new(store: Arc<dyn RecordStore>, failures: u32) -> Self {
        Self {
            store,
            failures,
            message: "server selection timeout".to_string(),
            attempts: AtomicU32::new(0),
        }
    }

    /// Error message reported by failing attempts
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// How many times `connect` has been called
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for ScriptedConnector {
    async fn connect(&self) -> StorageResult<Arc<dyn RecordStore>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(StorageError::backend(self.message.clone()));
        }
        Ok(self.store.clone())
    }

    fn describe(&self) -> String {
        format!("scripted://{}", self.store.backend_name())
    }
}

/// Observer that keeps every event it sees
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ConnectionEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ConnectionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ConnectionObserver for RecordingObserver {
    fn on_event(&self, event: &ConnectionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
