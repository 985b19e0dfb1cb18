//! Load driver configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Load driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadgenConfig {
    /// Base URL of the service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ramp stages, run in order
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,

    /// Pass/fail criteria
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Client-side timeout per request
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Per-request latency above which the latency check fails
    #[serde(with = "humantime_serde", default = "default_max_response_time")]
    pub max_response_time: Duration,

    /// How often the VU pool is resized to the stage target
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// Time VUs get to finish in-flight requests once the last stage ends
    #[serde(with = "humantime_serde", default = "default_graceful_stop")]
    pub graceful_stop: Duration,

    /// Log every failed request
    #[serde(default = "crate::domains::utils::default_false")]
    pub verbose: bool,
}

/// One ramp stage: move linearly to `target` VUs over `duration`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub target: u32,
}

impl StageConfig {
    pub fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

/// Threshold limits evaluated after the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// 95th percentile response time limit in milliseconds
    pub p95_ms: u64,
    /// 99th percentile response time limit in milliseconds
    pub p99_ms: u64,
    /// Maximum fraction of requests failing any check
    pub max_error_rate: f64,
    /// Maximum fraction of requests failing at the HTTP level
    pub max_http_failure_rate: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            p95_ms: 2000,
            p99_ms: 5000,
            max_error_rate: 0.01,
            max_http_failure_rate: 0.01,
        }
    }
}

impl Default for LoadgenConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stages: default_stages(),
            thresholds: ThresholdConfig::default(),
            request_timeout: default_request_timeout(),
            max_response_time: default_max_response_time(),
            tick_interval: default_tick_interval(),
            graceful_stop: default_graceful_stop(),
            verbose: false,
        }
    }
}

impl LoadgenConfig {
    /// Sum of all stage durations
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}

impl Validatable for LoadgenConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;

        if self.stages.is_empty() {
            return Err(self.validation_error("At least one stage must be configured"));
        }

        if self.stages.iter().any(|s| s.duration.is_zero()) {
            return Err(self.validation_error("Stage durations must be greater than 0"));
        }

        validate_positive(self.request_timeout.as_millis(), "request_timeout", self.domain_name())?;
        validate_positive(self.tick_interval.as_millis(), "tick_interval", self.domain_name())?;

        let rates = [
            ("max_error_rate", self.thresholds.max_error_rate),
            ("max_http_failure_rate", self.thresholds.max_http_failure_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(self.validation_error(format!(
                    "{} must be between 0 and 1, got {}",
                    name, rate
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "loadgen"
    }
}

fn default_base_url() -> String {
    "http://assessment.local".to_string()
}

fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new(Duration::from_secs(60), 1000),
        StageConfig::new(Duration::from_secs(120), 5000),
        StageConfig::new(Duration::from_secs(180), 10000),
        StageConfig::new(Duration::from_secs(300), 10000),
        StageConfig::new(Duration::from_secs(120), 0),
    ]
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_response_time() -> Duration {
    Duration::from_millis(2000)
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_graceful_stop() -> Duration {
    Duration::from_secs(30)
}
