//! Assessor HTTP service
//!
//! A deliberately small service for exercising a document store under load:
//! two probes, a write-then-read endpoint and a count endpoint. The listener
//! comes up immediately; storage connects in the background and every
//! storage-backed endpoint answers 503 until it does.

pub mod app;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod startup;

pub use app::{create_app, AppConfig};
pub use context::AppContext;
pub use errors::{ApiError, ApiResult};
pub use startup::Server;
