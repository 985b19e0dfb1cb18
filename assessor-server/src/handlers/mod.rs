//! Request handlers

pub mod data;
pub mod health;
pub mod stats;

pub use data::{generate_data, DataResponse, READS_PER_REQUEST, WRITES_PER_REQUEST};
pub use health::{liveness_check, readiness_check};
pub use stats::{get_stats, StatsResponse};
