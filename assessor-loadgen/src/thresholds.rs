//! Pass/fail evaluation of a finished run

use assessor_config::ThresholdConfig;
use serde::Serialize;
use std::fmt;

use crate::metrics::RunSummary;

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdResult {
    pub metric: &'static str,
    /// Human readable condition, e.g. `p(95)<2000`
    pub condition: String,
    pub observed: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub results: Vec<ThresholdResult>,
}

impl ThresholdReport {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ThresholdResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

impl fmt::Display for ThresholdReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thresholds:")?;
        for result in &self.results {
            writeln!(
                f,
                "  {} {:<16} {:<22} observed {:.4}",
                if result.passed { "✓" } else { "✗" },
                result.metric,
                result.condition,
                result.observed
            )?;
        }
        Ok(())
    }
}

/// Every limit is strict: the observed value must be below it
pub fn evaluate_thresholds(summary: &RunSummary, thresholds: &ThresholdConfig) -> ThresholdReport {
    let below =
        |metric: &'static str, condition: String, observed: f64, limit: f64| ThresholdResult {
            metric,
            condition,
            observed,
            passed: observed < limit,
        };

    ThresholdReport {
        results: vec![
            below(
                "http_req_duration",
                format!("p(95)<{}", thresholds.p95_ms),
                summary.p95_response_time_ms as f64,
                thresholds.p95_ms as f64,
            ),
            below(
                "http_req_duration",
                format!("p(99)<{}", thresholds.p99_ms),
                summary.p99_response_time_ms as f64,
                thresholds.p99_ms as f64,
            ),
            below(
                "error_rate",
                format!("rate<{}", thresholds.max_error_rate),
                summary.error_rate,
                thresholds.max_error_rate,
            ),
            below(
                "http_req_failed",
                format!("rate<{}", thresholds.max_http_failure_rate),
                summary.http_req_failed,
                thresholds.max_http_failure_rate,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(p95: u64, p99: u64, error_rate: f64, http_req_failed: f64) -> RunSummary {
        RunSummary {
            total_requests: 1000,
            successful_requests: 1000,
            failed_requests: 0,
            http_failures: 0,
            error_rate,
            http_req_failed,
            average_response_time_ms: 100.0,
            min_response_time_ms: 1,
            max_response_time_ms: p99,
            p50_response_time_ms: 80,
            p95_response_time_ms: p95,
            p99_response_time_ms: p99,
            requests_per_second: 100.0,
            total_duration_ms: 10_000,
            checks: Vec::new(),
        }
    }

    #[test]
    fn test_healthy_run_passes() {
        let report =
            evaluate_thresholds(&summary(450, 1200, 0.001, 0.0), &ThresholdConfig::default());
        assert!(report.all_passed());
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_limits_are_strict() {
        let report =
            evaluate_thresholds(&summary(2000, 1200, 0.0, 0.0), &ThresholdConfig::default());
        assert!(!report.all_passed());
        let failed: Vec<_> = report.failures().map(|r| r.condition.as_str()).collect();
        assert_eq!(failed, vec!["p(95)<2000"]);
    }

    #[test]
    fn test_rate_thresholds() {
        let report =
            evaluate_thresholds(&summary(100, 200, 0.02, 0.011), &ThresholdConfig::default());
        let failed: Vec<_> = report.failures().map(|r| r.metric).collect();
        assert_eq!(failed, vec!["error_rate", "http_req_failed"]);
    }
}
