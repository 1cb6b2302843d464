//! Inventory discovery errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::GuestKind;

/// Errors raised while walking the cluster inventory.
///
/// Only `ListNodes` aborts a pass; the other variants are logged and the
/// affected node or guest is left out of the catalog.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum DiscoveryError {
    /// The cluster node list could not be fetched
    #[error("Failed to list cluster nodes: {message}")]
    ListNodes { message: String },

    /// A node's VM or container listing failed
    #[error("Failed to list {kind} guests on node {node}: {message}")]
    ListGuests { node: String, kind: GuestKind, message: String },

    /// A guest's configuration (and thus its description) could not be read
    #[error("Failed to fetch config of guest {vmid} on node {node}: {message}")]
    GuestConfig { node: String, vmid: u64, message: String },

    /// Address discovery for a guest failed
    #[error("Failed to fetch addresses of guest {vmid} on node {node}: {message}")]
    GuestAddresses { node: String, vmid: u64, message: String },
}
