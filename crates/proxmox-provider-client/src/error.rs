//! Error types for the Proxmox client.

use thiserror::Error;

/// Errors that can occur when talking to the Proxmox API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed (connect, TLS, timeout).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-2xx status.
    #[error("API request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body returned by the server.
        message: String,
    },

    /// Server returned a body that does not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
