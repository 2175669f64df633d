//! Configuration validation framework

use crate::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// URL validation regex - `None` if compilation failed, in which case
/// `validate_url` falls back to a scheme prefix check
static URL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").ok());

/// Trait for validating configuration values
pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a URL string
///
/// # Errors
/// Returns `ConfigError::InvalidUrl` if the URL format is invalid
pub fn validate_url(url: &str, _field_name: &str) -> ConfigResult<()> {
    let valid = URL_REGEX.as_ref().map_or_else(
        || url.starts_with("http://") || url.starts_with("https://"),
        |regex| regex.is_match(url),
    );

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            url: url.to_string(),
        })
    }
}

/// Validate a value is within a range
///
/// # Errors
/// Returns `ConfigError::OutOfRange` if value is outside the specified range
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if value < min || value > max {
        Err(ConfigError::OutOfRange {
            field: field_name.to_string(),
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Validate a string is not empty
///
/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a string is one of a fixed set of choices (case-insensitive)
///
/// # Errors
/// Returns `ConfigError::InvalidChoice` if the value matches none of `choices`
pub fn validate_choice(value: &str, choices: &[&str], field_name: &str) -> ConfigResult<()> {
    let lowered = value.to_lowercase();
    if choices.iter().any(|choice| *choice == lowered) {
        Ok(())
    } else {
        Err(ConfigError::InvalidChoice {
            field: field_name.to_string(),
            value: value.to_string(),
            expected: choices.join(", "),
        })
    }
}
