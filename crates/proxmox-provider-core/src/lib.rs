//! # Proxmox Provider Core
//!
//! Turns a Proxmox VE cluster into dynamic routing configuration.
//!
//! ```text
//! Inventory ──► catalog::build_catalog ──► synthesize::synthesize ──► Provider ──► mpsc channel
//!                      │
//!                labels::parse (per guest description)
//! ```
//!
//! - [`labels`] extracts `traefik.*` labels from a guest description
//! - [`catalog`] walks nodes, VMs and containers into a [`Catalog`]
//! - [`synthesize`] folds a catalog into one [`RoutingConfiguration`]
//! - [`provider`] runs discovery and synthesis on a fixed interval

pub mod catalog;
pub mod inventory;
pub mod labels;
pub mod logger;
pub mod provider;
pub mod synthesize;

#[cfg(test)]
mod test_support;

pub use catalog::build_catalog;
pub use inventory::Inventory;
pub use provider::{Provider, ProviderState};
pub use synthesize::synthesize;

pub use proxmox_provider_types::{Catalog, RoutingConfiguration};
