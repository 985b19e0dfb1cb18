//! Resilience patterns for the assessor service
//!
//! Only connection establishment is retried; individual storage operations
//! are never retried.

pub mod retry;

// Re-export commonly used types
pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
