//! Document store configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_connection_string, validate_positive, validate_required_string, Validatable,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Database name used when neither the config nor the URI names one
pub const DEFAULT_DATABASE_NAME: &str = "assessmentdb";

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URI (e.g., "mongodb://mongo:27017/assessmentdb")
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Explicit database name; falls back to the URI path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,

    /// Collection the data endpoint writes to and reads from
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Number of connection attempts made at startup
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,

    /// Fixed delay between connection attempts, in milliseconds
    #[serde(default = "default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,

    /// Driver server selection timeout
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_server_selection_timeout"
    )]
    pub server_selection_timeout: Duration,

    /// Driver socket connect timeout
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Length of the random payload written with each record
    #[serde(default = "default_payload_size")]
    pub payload_size: usize,
}

impl DatabaseConfig {
    /// Delay between connection attempts
    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    /// Database name from config, else from the URI path, else the default
    pub fn resolved_database_name(&self) -> String {
        self.database_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| database_from_uri(&self.uri))
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string())
    }
}

/// Extract the database segment from `scheme://hosts/database?options`
fn database_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database_name: None,
            collection: default_collection(),
            max_connect_attempts: default_max_connect_attempts(),
            connect_retry_delay_ms: default_connect_retry_delay_ms(),
            server_selection_timeout: default_server_selection_timeout(),
            connect_timeout: default_connect_timeout(),
            payload_size: default_payload_size(),
        }
    }
}

impl Validatable for DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_connection_string(
            &self.uri,
            &["mongodb", "mongodb+srv"],
            "uri",
            self.domain_name(),
        )?;
        validate_required_string(&self.collection, "collection", self.domain_name())?;
        validate_positive(self.max_connect_attempts, "max_connect_attempts", self.domain_name())?;
        validate_positive(self.payload_size, "payload_size", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "database"
    }
}

fn default_uri() -> String {
    "mongodb://mongo:27017/assessmentdb".to_string()
}

fn default_collection() -> String {
    "records".to_string()
}

fn default_max_connect_attempts() -> u32 {
    10
}

fn default_connect_retry_delay_ms() -> u64 {
    5000
}

fn default_server_selection_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_payload_size() -> usize {
    512
}
