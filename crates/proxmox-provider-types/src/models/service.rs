//! Services discovered during one poll pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::inventory::{GuestKind, IpAddress};

/// Discovered services grouped by node name.
pub type Catalog = BTreeMap<String, Vec<DiscoveredService>>;

/// One running VM or container with its routing labels.
///
/// Built fresh on every pass and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveredService {
    /// Hypervisor-assigned guest ID, unique within the cluster
    pub id: u64,
    /// Display name, not unique across nodes
    pub name: String,
    pub kind: GuestKind,
    /// `traefik.`-prefixed labels parsed from the description
    pub labels: HashMap<String, String>,
    /// Addresses in the order reported by the guest, possibly empty
    pub addresses: Vec<IpAddress>,
}

impl DiscoveredService {
    pub fn new(id: u64, name: &str, kind: GuestKind, labels: HashMap<String, String>) -> Self {
        Self { id, name: name.to_string(), kind, labels, addresses: Vec::new() }
    }

    pub fn with_addresses(mut self, addresses: Vec<IpAddress>) -> Self {
        self.addresses = addresses;
        self
    }

    /// `<name>-<id>`, used when labels name no router or service.
    pub fn default_unit_name(&self) -> String {
        format!("{}-{}", self.name, self.id)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
