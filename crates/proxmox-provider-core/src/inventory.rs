//! Read-only view of the cluster inventory used by the catalog builder.

use async_trait::async_trait;
use proxmox_provider_client::{ClientError, ProxmoxClient};
use proxmox_provider_types::models::{GuestKind, GuestSummary, IpAddress, NodeStatus};
use proxmox_provider_types::DiscoveryError;

/// Source of nodes, guests, descriptions and addresses.
///
/// Implemented by [`ProxmoxClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn nodes(&self) -> Result<Vec<NodeStatus>, DiscoveryError>;

    async fn guests(&self, node: &str, kind: GuestKind)
        -> Result<Vec<GuestSummary>, DiscoveryError>;

    /// Free-text description of a guest.
    async fn description(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
    ) -> Result<String, DiscoveryError>;

    /// Live network addresses, guest agent for VMs, interface list for containers.
    async fn addresses(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
    ) -> Result<Vec<IpAddress>, DiscoveryError>;
}

#[async_trait]
impl Inventory for ProxmoxClient {
    async fn nodes(&self) -> Result<Vec<NodeStatus>, DiscoveryError> {
        ProxmoxClient::nodes(self)
            .await
            .map_err(|e| DiscoveryError::ListNodes { message: e.to_string() })
    }

    async fn guests(
        &self,
        node: &str,
        kind: GuestKind,
    ) -> Result<Vec<GuestSummary>, DiscoveryError> {
        ProxmoxClient::guests(self, node, kind).await.map_err(|e| DiscoveryError::ListGuests {
            node: node.to_string(),
            kind,
            message: e.to_string(),
        })
    }

    async fn description(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
    ) -> Result<String, DiscoveryError> {
        self.guest_config(node, kind, vmid).await.map(|config| config.description).map_err(|e| {
            DiscoveryError::GuestConfig { node: node.to_string(), vmid, message: e.to_string() }
        })
    }

    async fn addresses(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
    ) -> Result<Vec<IpAddress>, DiscoveryError> {
        let result: Result<Vec<IpAddress>, ClientError> = match kind {
            GuestKind::Qemu => self.agent_interfaces(node, vmid).await.map(|ifaces| ifaces.addresses()),
            GuestKind::Lxc => self
                .container_interfaces(node, vmid)
                .await
                .map(|ifaces| ifaces.iter().flat_map(|iface| iface.addresses()).collect()),
        };

        result.map_err(|e| DiscoveryError::GuestAddresses {
            node: node.to_string(),
            vmid,
            message: e.to_string(),
        })
    }
}
