//! Domain-driven configuration management for the assessor service
//!
//! Configuration is split by functional domain (server, database, logging),
//! each with its own defaults and validation. Values can be loaded from a
//! YAML or JSON file and overridden from the environment.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    database::DatabaseConfig,
    loadgen::{LoadgenConfig, StageConfig, ThresholdConfig},
    logging::{LogFormat, LogLevel, LoggingConfig},
    server::ServerConfig,
    AssessorConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
