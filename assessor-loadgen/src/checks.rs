//! Per-response checks

use serde_json::Value;
use std::time::Duration;

pub const CHECK_STATUS_200: &str = "status is 200";
pub const CHECK_STATUS_FIELD: &str = "response has status field";
pub const CHECK_RESPONSE_TIME: &str = "response time < 2s";

/// Check names in report order
pub const CHECK_NAMES: [&str; 3] = [CHECK_STATUS_200, CHECK_STATUS_FIELD, CHECK_RESPONSE_TIME];

/// What came back for one request
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// `None` on transport failure or client timeout
    pub status: Option<u16>,
    pub duration: Duration,
    pub body: Option<String>,
}

impl RequestOutcome {
    pub fn transport_failure(duration: Duration) -> Self {
        Self {
            status: None,
            duration,
            body: None,
        }
    }

    /// Failed at the HTTP level: no response or a status outside 2xx/3xx
    pub fn http_failed(&self) -> bool {
        !matches!(self.status, Some(status) if (200..400).contains(&status))
    }

    fn body_reports_success(&self) -> bool {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
            .is_some_and(|json| json.get("status").and_then(Value::as_str) == Some("success"))
    }
}

/// Result of every check against one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResults {
    pub status_ok: bool,
    pub has_status_field: bool,
    pub fast_enough: bool,
}

impl CheckResults {
    pub fn evaluate(outcome: &RequestOutcome, max_response_time: Duration) -> Self {
        Self {
            status_ok: outcome.status == Some(200),
            has_status_field: outcome.body_reports_success(),
            fast_enough: outcome.duration < max_response_time,
        }
    }

    pub fn passed(&self) -> bool {
        self.status_ok && self.has_status_field && self.fast_enough
    }

    /// Pass flags in [`CHECK_NAMES`] order
    pub fn as_array(&self) -> [bool; 3] {
        [self.status_ok, self.has_status_field, self.fast_enough]
    }
}
