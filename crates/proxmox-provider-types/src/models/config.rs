//! Provider configuration.
//!
//! [`ProviderConfig`] mirrors the options accepted from the plugin host or a
//! config file, all as strings. [`ProviderConfig::validate_settings`] turns it
//! into typed [`ProviderSettings`] or fails with a [`ConfigError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use super::duration::GoDuration;
use crate::error::ConfigError;

/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: &str = "30s";

/// Raw provider options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Go-style duration between passes
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Base URL of the Proxmox VE API, e.g. `https://pve.example.com:8006`
    #[serde(default)]
    #[validate(length(min = 1_u64), url)]
    pub api_endpoint: String,
    /// API token ID, e.g. `root@pam!traefik`
    #[serde(default)]
    #[validate(length(min = 1_u64))]
    pub api_token_id: String,
    /// API token secret
    #[serde(default)]
    #[validate(length(min = 1_u64))]
    pub api_token: String,
    /// `info` or `debug`
    #[serde(default = "default_api_logging")]
    pub api_logging: String,
    /// `true` or `false`
    #[serde(default = "default_validate_ssl", rename = "apiValidateSSL")]
    pub api_validate_ssl: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            api_endpoint: String::new(),
            api_token_id: String::new(),
            api_token: String::new(),
            api_logging: default_api_logging(),
            api_validate_ssl: default_validate_ssl(),
        }
    }
}

fn default_poll_interval() -> String {
    DEFAULT_POLL_INTERVAL.to_string()
}

fn default_api_logging() -> String {
    ApiLogLevel::Info.to_string()
}

fn default_validate_ssl() -> String {
    "true".to_string()
}

/// Verbosity of API request logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiLogLevel {
    #[default]
    Info,
    Debug,
}

impl FromStr for ApiLogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(ConfigError::invalid(
                "api_logging",
                format!("expected \"info\" or \"debug\", got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for ApiLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Debug => "debug",
        })
    }
}

/// Validated, typed provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub poll_interval: Duration,
    pub api_endpoint: String,
    pub api_token_id: String,
    pub api_token: String,
    pub api_logging: ApiLogLevel,
    pub validate_ssl: bool,
}

impl ProviderConfig {
    /// Check every option and produce typed settings.
    pub fn validate_settings(&self) -> Result<ProviderSettings, ConfigError> {
        if let Err(errors) = self.validate() {
            return Err(first_validation_error(&errors));
        }

        let poll_interval = parse_poll_interval(&self.poll_interval)?;
        let api_logging = self.api_logging.parse::<ApiLogLevel>()?;
        let validate_ssl = parse_bool("api_validate_ssl", &self.api_validate_ssl)?;

        Ok(ProviderSettings {
            poll_interval,
            api_endpoint: self.api_endpoint.trim_end_matches('/').to_string(),
            api_token_id: self.api_token_id.clone(),
            api_token: self.api_token.clone(),
            api_logging,
            validate_ssl,
        })
    }
}

/// Parse a poll interval and enforce [`MIN_POLL_INTERVAL`].
pub fn parse_poll_interval(raw: &str) -> Result<Duration, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::missing("poll_interval"));
    }

    let parsed = raw.parse::<GoDuration>().map_err(|e| ConfigError::InvalidPollInterval {
        value: raw.to_string(),
        message: e.to_string(),
    })?;

    if parsed.is_negative() || parsed.as_duration() < MIN_POLL_INTERVAL {
        return Err(ConfigError::PollIntervalTooShort {
            value: raw.to_string(),
            minimum_secs: MIN_POLL_INTERVAL.as_secs(),
        });
    }

    Ok(parsed.as_duration())
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => {
            Err(ConfigError::invalid(field, format!("expected \"true\" or \"false\", got {other:?}")))
        },
    }
}

/// Map validator output to a single deterministic error (first field by name).
fn first_validation_error(errors: &validator::ValidationErrors) -> ConfigError {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.iter().map(|e| e.code.to_string()).collect()))
        .collect();
    fields.sort();

    match fields.into_iter().next() {
        Some((field, codes)) if codes.iter().any(|c| c == "length") => ConfigError::missing(&field),
        Some((field, _)) => ConfigError::invalid(&field, "must be a valid URL"),
        None => ConfigError::invalid("config", "validation failed"),
    }
}
