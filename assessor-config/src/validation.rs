//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate an HTTP(S) URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(url, field_name, domain)?;

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} scheme '{}' not supported (only http/https)", field_name, scheme),
        }),
    }
}

/// Validate a connection string by scheme prefix.
///
/// MongoDB seed lists (`host1:27017,host2:27017`) are not valid URL
/// authorities, so only the scheme is checked here and the driver does the
/// full parse.
pub fn validate_connection_string(
    value: &str,
    allowed_schemes: &[&str],
    field_name: &str,
    domain: &str,
) -> ConfigResult<()> {
    validate_required_string(value, field_name, domain)?;

    let scheme = value.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        Some(scheme) if allowed_schemes.contains(&scheme) => Ok(()),
        _ => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} must start with one of: {}",
                field_name,
                allowed_schemes
                    .iter()
                    .map(|s| format!("{}://", s))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}
