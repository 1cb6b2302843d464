use std::time::Duration;

use proxmox_provider_types::models::{ApiLogLevel, ProviderSettings};

/// Configuration for the Proxmox client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without the `/api2/json` suffix.
    pub base_url: String,
    /// API token ID (`user@realm!name`).
    pub token_id: String,
    /// API token secret.
    pub token: String,
    /// Verify the server's TLS certificate.
    pub validate_ssl: bool,
    /// Log every request and response body at debug level.
    pub debug: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:8006".to_string(),
            token_id: String::new(),
            token: String::new(),
            validate_ssl: true,
            debug: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ProviderSettings> for ClientConfig {
    fn from(settings: &ProviderSettings) -> Self {
        Self {
            base_url: settings.api_endpoint.clone(),
            token_id: settings.api_token_id.clone(),
            token: settings.api_token.clone(),
            validate_ssl: settings.validate_ssl,
            debug: settings.api_logging == ApiLogLevel::Debug,
            ..Default::default()
        }
    }
}
