//! Request tracking and aggregate statistics

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::checks::{CheckResults, RequestOutcome, CHECK_NAMES};

/// Shared request tracker, cloned into every virtual user
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    response_times: Arc<tokio::sync::Mutex<Vec<u64>>>,
    successful_requests: Arc<AtomicU64>,
    failed_requests: Arc<AtomicU64>,
    http_failures: Arc<AtomicU64>,
    check_passes: Arc<[AtomicU64; 3]>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, outcome: &RequestOutcome, checks: &CheckResults) {
        if checks.passed() {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        if outcome.http_failed() {
            self.http_failures.fetch_add(1, Ordering::Relaxed);
        }

        for (counter, passed) in self.check_passes.iter().zip(checks.as_array()) {
            if passed {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.response_times.lock().await.push(outcome.duration.as_millis() as u64);
    }

    pub fn total_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
            + self.failed_requests.load(Ordering::Relaxed)
    }

    pub async fn summary(&self, elapsed: Duration) -> RunSummary {
        let mut response_times = self.response_times.lock().await.clone();
        response_times.sort_unstable();

        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let http_failures = self.http_failures.load(Ordering::Relaxed);
        let total = successful + failed;

        let rate = |count: u64| if total > 0 { count as f64 / total as f64 } else { 0.0 };

        let checks = CHECK_NAMES
            .iter()
            .zip(self.check_passes.iter())
            .map(|(name, passes)| CheckSummary {
                name: name.to_string(),
                passes: passes.load(Ordering::Relaxed),
                total,
            })
            .collect();

        let average_response_time_ms = if response_times.is_empty() {
            0.0
        } else {
            response_times.iter().sum::<u64>() as f64 / response_times.len() as f64
        };

        let elapsed_ms = elapsed.as_millis() as u64;

        RunSummary {
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            http_failures,
            error_rate: rate(failed),
            http_req_failed: rate(http_failures),
            average_response_time_ms,
            min_response_time_ms: response_times.first().copied().unwrap_or(0),
            max_response_time_ms: response_times.last().copied().unwrap_or(0),
            p50_response_time_ms: percentile(&response_times, 50),
            p95_response_time_ms: percentile(&response_times, 95),
            p99_response_time_ms: percentile(&response_times, 99),
            requests_per_second: if elapsed_ms > 0 {
                (total as f64 * 1000.0) / elapsed_ms as f64
            } else {
                0.0
            },
            total_duration_ms: elapsed_ms,
            checks,
        }
    }
}

/// Nearest-rank style percentile over an ascending slice; 0 when empty
pub fn percentile(sorted: &[u64], p: usize) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let index = (sorted.len() * p / 100).min(sorted.len() - 1);
    sorted[index]
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub total: u64,
}

/// Aggregate results of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub http_failures: u64,
    /// Fraction of requests failing any check
    pub error_rate: f64,
    /// Fraction of requests failing at the HTTP level
    pub http_req_failed: f64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p50_response_time_ms: u64,
    pub p95_response_time_ms: u64,
    pub p99_response_time_ms: u64,
    pub requests_per_second: f64,
    pub total_duration_ms: u64,
    pub checks: Vec<CheckSummary>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Load Test Results ===")?;
        writeln!(f, "Total Requests: {}", self.total_requests)?;
        writeln!(f, "Successful: {}", self.successful_requests)?;
        writeln!(f, "Failed: {} ({:.2}%)", self.failed_requests, self.error_rate * 100.0)?;
        writeln!(
            f,
            "HTTP Failures: {} ({:.2}%)",
            self.http_failures,
            self.http_req_failed * 100.0
        )?;
        writeln!(f, "Test Duration: {:.2}s", self.total_duration_ms as f64 / 1000.0)?;
        writeln!(f, "Requests/Second: {:.2}", self.requests_per_second)?;
        writeln!(f, "Response Times:")?;
        writeln!(f, "  Average: {:.2}ms", self.average_response_time_ms)?;
        writeln!(f, "  P50: {}ms", self.p50_response_time_ms)?;
        writeln!(f, "  P95: {}ms", self.p95_response_time_ms)?;
        writeln!(f, "  P99: {}ms", self.p99_response_time_ms)?;
        writeln!(f, "  Min: {}ms", self.min_response_time_ms)?;
        writeln!(f, "  Max: {}ms", self.max_response_time_ms)?;
        writeln!(f, "Checks:")?;
        for check in &self.checks {
            writeln!(f, "  {}: {}/{}", check.name, check.passes, check.total)?;
        }
        Ok(())
    }
}
