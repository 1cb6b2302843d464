//! Entity catalog builder.
//!
//! Walks every node, lists VMs then containers, and turns each running guest
//! into a [`DiscoveredService`]. Only the node listing is fatal; a node or a
//! guest that cannot be read is logged and left out.

use proxmox_provider_types::models::{GuestKind, GuestSummary, IpAddress};
use proxmox_provider_types::{Catalog, DiscoveredService, DiscoveryError};

use crate::inventory::Inventory;
use crate::labels;

const GUEST_KINDS: [GuestKind; 2] = [GuestKind::Qemu, GuestKind::Lxc];

/// Build the catalog for one pass.
pub async fn build_catalog(inventory: &dyn Inventory) -> Result<Catalog, DiscoveryError> {
    let nodes = inventory.nodes().await?;
    let mut catalog = Catalog::new();

    for node in nodes {
        if node.status.as_deref() == Some("offline") {
            tracing::debug!("Skipping offline node {}", node.node);
            continue;
        }

        match scan_node(inventory, &node.node).await {
            Ok(services) => {
                catalog.insert(node.node, services);
            },
            Err(e) => {
                tracing::warn!("Error scanning services on node {}: {}", node.node, e);
            },
        }
    }

    Ok(catalog)
}

async fn scan_node(
    inventory: &dyn Inventory,
    node: &str,
) -> Result<Vec<DiscoveredService>, DiscoveryError> {
    let mut services = Vec::new();

    for kind in GUEST_KINDS {
        let guests = inventory.guests(node, kind).await?;

        for guest in guests {
            tracing::debug!(
                "Scanning {} {}/{} ({}): {}",
                kind,
                node,
                guest.name,
                guest.vmid,
                guest.status
            );
            if !guest.is_running() {
                continue;
            }

            match discover_guest(inventory, node, kind, &guest).await {
                Ok(service) => services.push(service),
                Err(e) => {
                    tracing::warn!("Skipping {} {} on node {}: {}", kind, guest.vmid, node, e);
                },
            }
        }
    }

    Ok(services)
}

async fn discover_guest(
    inventory: &dyn Inventory,
    node: &str,
    kind: GuestKind,
    guest: &GuestSummary,
) -> Result<DiscoveredService, DiscoveryError> {
    let description = inventory.description(node, kind, guest.vmid).await?;
    let labels = labels::parse(&description);
    tracing::debug!("{} {} ({}) labels: {:?}", kind, guest.name, guest.vmid, labels);

    let addresses = match inventory.addresses(node, kind, guest.vmid).await {
        Ok(addresses) => routable(addresses),
        Err(e) => {
            tracing::debug!("No addresses for {} {} on node {}: {}", kind, guest.vmid, node, e);
            Vec::new()
        },
    };

    Ok(DiscoveredService::new(guest.vmid, &guest.name, kind, labels).with_addresses(addresses))
}

/// Drop empty and loopback entries, keeping the reported order.
fn routable(addresses: Vec<IpAddress>) -> Vec<IpAddress> {
    addresses.into_iter().filter(|a| !a.address.is_empty() && !a.is_loopback()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeInventory;

    #[tokio::test]
    async fn test_only_running_guests_are_cataloged() {
        let inventory = FakeInventory::new()
            .node("pve1")
            .vm("pve1", 100, "web", "running", "traefik.enable=true")
            .vm("pve1", 101, "old", "stopped", "traefik.enable=true")
            .container("pve1", 200, "cache", "running", "");

        let catalog = build_catalog(&inventory).await.expect("catalog");
        let services = &catalog["pve1"];

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "web");
        assert_eq!(services[0].kind, GuestKind::Qemu);
        assert_eq!(services[0].labels["traefik.enable"], "true");
        assert_eq!(services[1].name, "cache");
        assert_eq!(services[1].kind, GuestKind::Lxc);
        assert!(services[1].labels.is_empty());
    }

    #[tokio::test]
    async fn test_node_listing_failure_is_fatal() {
        let inventory = FakeInventory::new().fail_nodes();
        assert!(matches!(build_catalog(&inventory).await, Err(DiscoveryError::ListNodes { .. })));
    }

    #[tokio::test]
    async fn test_failing_node_is_skipped() {
        let inventory = FakeInventory::new()
            .node("pve1")
            .node("pve2")
            .vm("pve1", 100, "web", "running", "traefik.enable=true")
            .vm("pve2", 300, "api", "running", "traefik.enable=true")
            .fail_guests("pve1", GuestKind::Lxc);

        let catalog = build_catalog(&inventory).await.expect("catalog");

        assert!(!catalog.contains_key("pve1"));
        assert_eq!(catalog["pve2"][0].name, "api");
    }

    #[tokio::test]
    async fn test_failing_guest_config_is_skipped() {
        let inventory = FakeInventory::new()
            .node("pve1")
            .vm("pve1", 100, "web", "running", "traefik.enable=true")
            .vm("pve1", 101, "broken", "running", "traefik.enable=true")
            .fail_config(101);

        let catalog = build_catalog(&inventory).await.expect("catalog");
        let names: Vec<_> = catalog["pve1"].iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["web"]);
    }

    #[tokio::test]
    async fn test_address_failure_keeps_service() {
        let inventory = FakeInventory::new()
            .node("pve1")
            .vm("pve1", 100, "web", "running", "traefik.enable=true")
            .fail_addresses(100);

        let catalog = build_catalog(&inventory).await.expect("catalog");
        assert_eq!(catalog["pve1"].len(), 1);
        assert!(catalog["pve1"][0].addresses.is_empty());
    }

    #[tokio::test]
    async fn test_loopback_and_empty_addresses_dropped() {
        let inventory = FakeInventory::new()
            .node("pve1")
            .vm("pve1", 100, "web", "running", "traefik.enable=true")
            .addresses(
                100,
                vec![
                    IpAddress::new("127.0.0.1", "ipv4", 8),
                    IpAddress::new("::1", "ipv6", 128),
                    IpAddress::new("", "ipv4", 0),
                    IpAddress::new("10.0.0.5", "ipv4", 24),
                    IpAddress::new("fd00::5", "ipv6", 64),
                ],
            );

        let catalog = build_catalog(&inventory).await.expect("catalog");
        let addrs: Vec<_> = catalog["pve1"][0].addresses.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(addrs, vec!["10.0.0.5", "fd00::5"]);
    }

    #[tokio::test]
    async fn test_offline_nodes_are_not_scanned() {
        let inventory = FakeInventory::new()
            .offline_node("pve3")
            .vm("pve3", 100, "web", "running", "traefik.enable=true");

        let catalog = build_catalog(&inventory).await.expect("catalog");
        assert!(catalog.is_empty());
    }
}
