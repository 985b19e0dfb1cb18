//! Configuration loading and environment variable handling

use crate::domains::{
    database::DatabaseConfig,
    loadgen::LoadgenConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    AssessorConfig,
};
use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
///
/// Every override is read as `<PREFIX>_<NAME>`. A handful of names
/// (`MONGO_URI`, `APP_PORT`, `BASE_URL`, `VERBOSE`) are also honoured without
/// the prefix so the service keeps working with existing deployment
/// manifests; the prefixed form wins when both are set.
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

/// Names accepted without the prefix
const UNPREFIXED_ALIASES: &[&str] = &["MONGO_URI", "APP_PORT", "BASE_URL", "VERBOSE"];

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "ASSESSOR".to_string(),
        }
    }

    /// Load service configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<AssessorConfig> {
        let mut config: AssessorConfig = read_config_file(path.as_ref())?;
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load service configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<AssessorConfig> {
        let mut config = AssessorConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load service configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<AssessorConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Load load-driver configuration, optionally from a file, with environment overrides
    pub fn load_loadgen(
        &self,
        config_path: Option<impl AsRef<Path>>,
    ) -> ConfigResult<LoadgenConfig> {
        let mut config = match config_path {
            Some(path) => read_config_file(path.as_ref())?,
            None => LoadgenConfig::default(),
        };

        if let Some(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = base_url;
        }

        if let Some(verbose) = self.get_env_var("VERBOSE") {
            // Only the literal `true` turns verbose logging on
            config.verbose = verbose.trim().eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut AssessorConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server)?;
        self.apply_database_overrides(&mut config.database)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply server config overrides
    fn apply_server_overrides(&self, config: &mut ServerConfig) -> ConfigResult<()> {
        if let Some(bind) = self.get_env_var("BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Some(port) = self.get_env_var("APP_PORT") {
            config.port = parse_env(&port, "APP_PORT")?;
        }

        Ok(())
    }

    /// Apply database config overrides
    fn apply_database_overrides(&self, config: &mut DatabaseConfig) -> ConfigResult<()> {
        if let Some(uri) = self.get_env_var("MONGO_URI") {
            config.uri = uri;
        }

        if let Some(name) = self.get_env_var("DB_NAME") {
            config.database_name = Some(name);
        }

        if let Some(collection) = self.get_env_var("DB_COLLECTION") {
            config.collection = collection;
        }

        if let Some(attempts) = self.get_env_var("DB_CONNECT_ATTEMPTS") {
            config.max_connect_attempts = parse_env(&attempts, "DB_CONNECT_ATTEMPTS")?;
        }

        if let Some(delay) = self.get_env_var("DB_CONNECT_DELAY_MS") {
            config.connect_retry_delay_ms = parse_env(&delay, "DB_CONNECT_DELAY_MS")?;
        }

        if let Some(size) = self.get_env_var("PAYLOAD_SIZE") {
            config.payload_size = parse_env(&size, "PAYLOAD_SIZE")?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Some(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Some(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix, falling back to the bare name for aliases
    fn get_env_var(&self, name: &str) -> Option<String> {
        if let Ok(value) = std::env::var(format!("{}_{}", self.prefix, name)) {
            return Some(value);
        }

        if UNPREFIXED_ALIASES.contains(&name) {
            if let Ok(value) = std::env::var(name) {
                log::debug!("Using unprefixed environment variable {}", name);
                return Some(value);
            }
        }

        None
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T>(value: &str, name: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
}

/// Read a config file, choosing JSON or YAML by extension
fn read_config_file<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
