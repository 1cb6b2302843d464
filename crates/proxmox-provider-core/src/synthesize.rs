//! Configuration synthesizer.
//!
//! Folds a [`Catalog`] into one [`RoutingConfiguration`]. Pure and total:
//! whatever partial catalog discovery produced, a configuration comes out.
//!
//! Per enabled service:
//! 1. collect router and service unit names from the label keys
//! 2. fall back to `<name>-<id>` for either set when it is empty
//! 3. resolve each service unit's backend: URL label, else first address,
//!    else `<name>.<node>` hostname
//! 4. resolve each router unit's rule and target service
//!
//! Names are global: a unit defined by a later service replaces one of the
//! same name from an earlier service. Nodes are visited by name and guests in
//! discovery order, so the replacement order is stable.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use proxmox_provider_types::models::{Router, Service};
use proxmox_provider_types::{Catalog, DiscoveredService, RoutingConfiguration};

pub const ENABLE_LABEL: &str = "traefik.enable";

const ROUTERS_PREFIX: &str = "traefik.http.routers.";
const SERVICES_PREFIX: &str = "traefik.http.services.";

/// Backend port when no `loadbalancer.server.port` label is set.
pub const DEFAULT_PORT: &str = "80";

/// Every router gets the same priority; no label overrides it.
pub const ROUTER_PRIORITY: i32 = 1;

/// Router and service names declared by one service's labels.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnitNames {
    pub routers: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

impl UnitNames {
    /// Group label keys by the segment following `routers.` / `services.`.
    pub fn from_labels(labels: &HashMap<String, String>) -> Self {
        let mut units = Self::default();
        for key in labels.keys() {
            if let Some(name) = unit_name(key, ROUTERS_PREFIX) {
                units.routers.insert(name.to_string());
            }
            if let Some(name) = unit_name(key, SERVICES_PREFIX) {
                units.services.insert(name.to_string());
            }
        }
        units
    }

    /// Names for `service`, with `<name>-<id>` filling either empty set.
    pub fn resolve(service: &DiscoveredService) -> Self {
        let mut units = Self::from_labels(&service.labels);
        if units.routers.is_empty() {
            units.routers.insert(service.default_unit_name());
        }
        if units.services.is_empty() {
            units.services.insert(service.default_unit_name());
        }
        units
    }
}

/// `<prefix><name>.<attribute>` → `name`
fn unit_name<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let (name, attribute) = key.strip_prefix(prefix)?.split_once('.')?;
    (!name.is_empty() && !attribute.is_empty()).then_some(name)
}

fn router_label(router: &str, attribute: &str) -> String {
    format!("{}{}.{}", ROUTERS_PREFIX, router, attribute)
}

fn service_label(service: &str, attribute: &str) -> String {
    format!("{}{}.{}", SERVICES_PREFIX, service, attribute)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enablement {
    NoLabels,
    NotEnabled,
    Enabled,
}

fn enablement(service: &DiscoveredService) -> Enablement {
    if service.labels.is_empty() {
        Enablement::NoLabels
    } else if service.label(ENABLE_LABEL) == Some("true") {
        Enablement::Enabled
    } else {
        Enablement::NotEnabled
    }
}

/// Build the routing configuration for one pass.
pub fn synthesize(catalog: &Catalog) -> RoutingConfiguration {
    let mut config = RoutingConfiguration::default();

    for (node, services) in catalog {
        for service in services {
            match enablement(service) {
                Enablement::NoLabels => {
                    tracing::debug!(
                        "Skipping service {} (ID: {}) on {}: no traefik labels",
                        service.name,
                        service.id,
                        node
                    );
                    continue;
                },
                Enablement::NotEnabled => {
                    tracing::debug!(
                        "Skipping service {} (ID: {}) on {} because traefik.enable is not true",
                        service.name,
                        service.id,
                        node
                    );
                    continue;
                },
                Enablement::Enabled => {},
            }

            let (routers, services) = service_units(node, service);
            merge(&mut config.routers, routers, "Router", service);
            merge(&mut config.services, services, "Service", service);
        }
    }

    for (router, target) in config.dangling_routers() {
        tracing::warn!("Router {} targets service {} which is not defined", router, target);
    }

    config
}

/// Routers and services contributed by one enabled service.
fn service_units(
    node: &str,
    service: &DiscoveredService,
) -> (BTreeMap<String, Router>, BTreeMap<String, Service>) {
    let units = UnitNames::resolve(service);

    let services: BTreeMap<String, Service> = units
        .services
        .iter()
        .map(|name| (name.clone(), Service::single_backend(backend_url(node, service, name))))
        .collect();

    // `resolve` guarantees at least one service name.
    let default_target = units.services.first().cloned().unwrap_or_default();

    let routers: BTreeMap<String, Router> = units
        .routers
        .iter()
        .map(|name| {
            let router = Router {
                service: service
                    .label(&router_label(name, "service"))
                    .map_or_else(|| default_target.clone(), str::to_string),
                rule: service
                    .label(&router_label(name, "rule"))
                    .map_or_else(|| format!("Host(`{}`)", service.name), str::to_string),
                priority: ROUTER_PRIORITY,
            };
            (name.clone(), router)
        })
        .collect();

    tracing::debug!(
        "Created {} router(s) and {} service(s) for {} (ID: {})",
        routers.len(),
        services.len(),
        service.name,
        service.id
    );

    (routers, services)
}

/// Backend URL for service unit `unit`: explicit URL label, first discovered
/// address, then `<name>.<node>`.
fn backend_url(node: &str, service: &DiscoveredService, unit: &str) -> String {
    if let Some(url) = service.label(&service_label(unit, "loadbalancer.server.url")) {
        return url.to_string();
    }

    let port = service.label(&service_label(unit, "loadbalancer.server.port")).unwrap_or(DEFAULT_PORT);

    match service.addresses.iter().find(|a| !a.address.is_empty()) {
        Some(address) => format!("http://{}:{}", address.url_host(), port),
        None => {
            let url = format!("http://{}.{}:{}", service.name, node, port);
            tracing::debug!(
                "No IPs found, using hostname URL {} for service {} (ID: {})",
                url,
                service.name,
                service.id
            );
            url
        },
    }
}

fn merge<T>(
    target: &mut BTreeMap<String, T>,
    entries: BTreeMap<String, T>,
    kind: &str,
    owner: &DiscoveredService,
) {
    for (name, entry) in entries {
        if target.insert(name.clone(), entry).is_some() {
            tracing::debug!(
                "{} {} redefined by {} (ID: {}); last definition wins",
                kind,
                name,
                owner.name,
                owner.id
            );
        }
    }
}
