//! Staged load driver for the assessor service
//!
//! Ramps a pool of virtual users through a sequence of stages, each VU
//! hitting `GET /api/data` back to back. Every response is checked for
//! status, body shape and latency; the run passes only if the aggregate
//! percentiles and failure rates stay under the configured thresholds.

pub mod checks;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod stages;
pub mod thresholds;

pub use checks::{CheckResults, RequestOutcome};
pub use error::{LoadError, LoadResult};
pub use metrics::{MetricsTracker, RunSummary};
pub use runner::{LoadRunner, RunReport};
pub use stages::{parse_stage, StageSchedule};
pub use thresholds::{evaluate_thresholds, ThresholdReport, ThresholdResult};
