//! Testing utilities for assessor-storage
//!
//! - `InMemoryRecordStore` - a process-local store with injectable failures
//! - `ScriptedConnector` - a connector that fails a fixed number of times
//! - `RecordingObserver` - captures connection lifecycle events
//! - mockall mocks of the storage traits
//!
//! ```toml
//! [dev-dependencies]
//! assessor-storage = { path = "../assessor-storage", features = ["testing"] }
//! ```

pub mod memory;
pub mod mocks;

pub use memory::{InMemoryRecordStore, RecordingObserver, ScriptedConnector};
pub use mocks::{MockConnector, MockStore};
