//! Shared handler state

use assessor_storage::{payload::DEFAULT_PAYLOAD_SIZE, StorageHandle};

/// State injected into every handler
#[derive(Debug, Clone)]
pub struct AppContext {
    pub storage: StorageHandle,
    /// Length in characters of the payload written with each record
    pub payload_size: usize,
}

impl AppContext {
    pub fn new(storage: StorageHandle) -> Self {
        Self {
            storage,
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }

    pub fn with_payload_size(mut self, payload_size: usize) -> Self {
        self.payload_size = payload_size;
        self
    }
}
