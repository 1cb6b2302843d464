//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while validating the provider configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// A required field was absent or empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// A field held a value outside its accepted set
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// Description of the problem
        message: String,
    },

    /// The poll interval could not be parsed as a duration
    #[error("Invalid poll interval {value:?}: {message}")]
    InvalidPollInterval {
        /// Raw interval string
        value: String,
        /// Parser diagnostic
        message: String,
    },

    /// The poll interval parsed but is below the accepted minimum
    #[error("Poll interval must be at least {minimum_secs} seconds, got {value}")]
    PollIntervalTooShort {
        /// Raw interval string
        value: String,
        /// Minimum accepted interval in seconds
        minimum_secs: u64,
    },
}

impl ConfigError {
    /// Create a missing-field error.
    pub fn missing(field: &str) -> Self {
        Self::MissingField { field: field.to_string() }
    }

    /// Create an invalid-value error.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue { field: field.to_string(), message: message.into() }
    }
}
