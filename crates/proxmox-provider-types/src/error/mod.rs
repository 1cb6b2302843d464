//! Typed error definitions for the provider.
//!
//! Configuration errors are fatal at construction time, discovery errors are
//! recoverable at runtime. Both are serializable so they can be attached to
//! structured log events or status output verbatim.

mod config;
mod discovery;

pub use config::ConfigError;
pub use discovery::DiscoveryError;

use thiserror::Error;

/// Unified error type returned by provider construction and lifecycle calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    /// Invalid or incomplete configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The inventory API could not be reached during the startup check
    #[error("Failed to reach Proxmox API at {endpoint}: {message}")]
    Connectivity {
        /// Base URL that was probed
        endpoint: String,
        /// Underlying failure
        message: String,
    },

    /// Inventory discovery failed
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The HTTP client could not be constructed
    #[error("Failed to build API client: {message}")]
    Client {
        /// Underlying failure
        message: String,
    },

    /// Lifecycle call not allowed in the current state
    #[error("Provider cannot be started while {state}")]
    InvalidState {
        /// Lifecycle state at the time of the call
        state: String,
    },
}

/// Standard Result type using ProviderError.
pub type Result<T> = std::result::Result<T, ProviderError>;
