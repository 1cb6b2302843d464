//! In-memory inventory for unit tests.

use async_trait::async_trait;
use proxmox_provider_types::models::{GuestKind, GuestSummary, IpAddress, NodeStatus};
use proxmox_provider_types::DiscoveryError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::inventory::Inventory;

#[derive(Default)]
pub(crate) struct FakeInventory {
    nodes: Vec<NodeStatus>,
    guests: HashMap<(String, GuestKind), Vec<GuestSummary>>,
    descriptions: HashMap<u64, String>,
    addresses: HashMap<u64, Vec<IpAddress>>,
    failing_node_listings: usize,
    failing_guests: HashSet<(String, GuestKind)>,
    failing_config: HashSet<u64>,
    failing_addresses: HashSet<u64>,
    panic_on_nodes: bool,
    node_calls: AtomicUsize,
}

impl FakeInventory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node(mut self, name: &str) -> Self {
        self.nodes.push(NodeStatus { node: name.to_string(), status: Some("online".to_string()) });
        self
    }

    pub(crate) fn offline_node(mut self, name: &str) -> Self {
        self.nodes.push(NodeStatus { node: name.to_string(), status: Some("offline".to_string()) });
        self
    }

    pub(crate) fn vm(self, node: &str, vmid: u64, name: &str, status: &str, description: &str) -> Self {
        self.guest(node, GuestKind::Qemu, vmid, name, status, description)
    }

    pub(crate) fn container(
        self,
        node: &str,
        vmid: u64,
        name: &str,
        status: &str,
        description: &str,
    ) -> Self {
        self.guest(node, GuestKind::Lxc, vmid, name, status, description)
    }

    fn guest(
        mut self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
        name: &str,
        status: &str,
        description: &str,
    ) -> Self {
        self.guests.entry((node.to_string(), kind)).or_default().push(GuestSummary {
            vmid,
            name: name.to_string(),
            status: status.to_string(),
        });
        self.descriptions.insert(vmid, description.to_string());
        self
    }

    pub(crate) fn addresses(mut self, vmid: u64, addresses: Vec<IpAddress>) -> Self {
        self.addresses.insert(vmid, addresses);
        self
    }

    pub(crate) fn fail_nodes(self) -> Self {
        self.fail_nodes_times(usize::MAX)
    }

    /// Fail the first `times` node listings, then succeed.
    pub(crate) fn fail_nodes_times(mut self, times: usize) -> Self {
        self.failing_node_listings = times;
        self
    }

    pub(crate) fn fail_guests(mut self, node: &str, kind: GuestKind) -> Self {
        self.failing_guests.insert((node.to_string(), kind));
        self
    }

    pub(crate) fn fail_config(mut self, vmid: u64) -> Self {
        self.failing_config.insert(vmid);
        self
    }

    pub(crate) fn fail_addresses(mut self, vmid: u64) -> Self {
        self.failing_addresses.insert(vmid);
        self
    }

    pub(crate) fn panic_on_nodes(mut self) -> Self {
        self.panic_on_nodes = true;
        self
    }

    /// Number of node listings served so far, one per pass.
    pub(crate) fn node_calls(&self) -> usize {
        self.node_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn nodes(&self) -> Result<Vec<NodeStatus>, DiscoveryError> {
        let call = self.node_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_nodes {
            panic!("inventory exploded");
        }
        if call < self.failing_node_listings {
            return Err(DiscoveryError::ListNodes { message: "connection refused".to_string() });
        }
        Ok(self.nodes.clone())
    }

    async fn guests(
        &self,
        node: &str,
        kind: GuestKind,
    ) -> Result<Vec<GuestSummary>, DiscoveryError> {
        let key = (node.to_string(), kind);
        if self.failing_guests.contains(&key) {
            return Err(DiscoveryError::ListGuests {
                node: node.to_string(),
                kind,
                message: "status 500".to_string(),
            });
        }
        Ok(self.guests.get(&key).cloned().unwrap_or_default())
    }

    async fn description(
        &self,
        node: &str,
        _kind: GuestKind,
        vmid: u64,
    ) -> Result<String, DiscoveryError> {
        if self.failing_config.contains(&vmid) {
            return Err(DiscoveryError::GuestConfig {
                node: node.to_string(),
                vmid,
                message: "status 500".to_string(),
            });
        }
        Ok(self.descriptions.get(&vmid).cloned().unwrap_or_default())
    }

    async fn addresses(
        &self,
        node: &str,
        _kind: GuestKind,
        vmid: u64,
    ) -> Result<Vec<IpAddress>, DiscoveryError> {
        if self.failing_addresses.contains(&vmid) {
            return Err(DiscoveryError::GuestAddresses {
                node: node.to_string(),
                vmid,
                message: "QEMU guest agent is not running".to_string(),
            });
        }
        Ok(self.addresses.get(&vmid).cloned().unwrap_or_default())
    }
}
