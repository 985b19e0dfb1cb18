//! HTTP listener configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Attach an `X-Request-ID` to every request and response
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_request_id: bool,

    /// Emit a tracing span per HTTP request
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,

    /// How long in-flight requests get to finish after a shutdown signal
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// `address:port` string suitable for binding a listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            enable_request_id: true,
            enable_tracing: true,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        validate_positive(self.port, "port", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}
