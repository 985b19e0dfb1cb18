use assessor_config::ConfigError;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Error, Debug)]
pub enum LoadError {
    /// Pre-flight readiness probe did not return 200
    #[error("Service not ready: {url} returned {status}")]
    NotReady { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid stage '{stage}': {reason}")]
    InvalidStage { stage: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
