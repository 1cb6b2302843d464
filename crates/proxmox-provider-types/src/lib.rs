//! # Proxmox Provider Types
//!
//! Core types, models, and error definitions for the Proxmox routing provider.
//!
//! - **`error`** - Typed error hierarchy for configuration, discovery and lifecycle
//! - **`models`** - Inventory wire models, discovered services, routing output, config
//!
//! ## Architecture Role
//!
//! `proxmox-provider-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!            proxmox-provider-types (this crate)
//!                        │
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//! proxmox-provider-client    proxmox-provider-core
//!          │                           │
//!          └─────────────┬─────────────┘
//!                        ▼
//!                 proxmox-provider
//! ```

pub mod error;
pub mod models;

pub use error::{ConfigError, DiscoveryError, ProviderError, Result};

pub use models::{
    ApiLogLevel, Catalog, DiscoveredService, GoDuration, GuestKind, IpAddress,
    ProviderConfig, ProviderSettings, RoutingConfiguration,
};
