//! Routing configuration emitted once per poll pass.
//!
//! Field names follow the dynamic configuration format of the consuming
//! router (`loadBalancer`, `passHostHeader`). Maps are ordered so that the
//! rendered document is stable between passes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete routing snapshot for one pass. Consumers treat each snapshot as a
/// full replacement of the previous one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingConfiguration {
    pub routers: BTreeMap<String, Router>,
    pub services: BTreeMap<String, Service>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Router {
    /// Name of the target service
    pub service: String,
    /// Match rule, e.g. ``Host(`app.example.com`)``
    pub rule: String,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    #[serde(rename = "loadBalancer")]
    pub load_balancer: LoadBalancer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadBalancer {
    pub servers: Vec<Server>,
    #[serde(rename = "passHostHeader")]
    pub pass_host_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub url: String,
}

impl Service {
    /// Load-balanced service with exactly one backend that forwards the Host header.
    pub fn single_backend(url: String) -> Self {
        Self {
            load_balancer: LoadBalancer { servers: vec![Server { url }], pass_host_header: true },
        }
    }

    /// URL of the first backend, if any.
    pub fn first_url(&self) -> Option<&str> {
        self.load_balancer.servers.first().map(|s| s.url.as_str())
    }
}

/// `{"http": {...}}` wrapper expected by the consuming router.
#[derive(Debug, Serialize)]
pub struct DynamicConfiguration<'a> {
    pub http: &'a RoutingConfiguration,
}

impl RoutingConfiguration {
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty() && self.services.is_empty()
    }

    /// View of this snapshot in the router's dynamic configuration layout.
    pub fn as_dynamic(&self) -> DynamicConfiguration<'_> {
        DynamicConfiguration { http: self }
    }

    /// Render the dynamic configuration document.
    pub fn to_dynamic_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.as_dynamic())
    }

    /// Routers whose target service is not defined in this snapshot,
    /// as `(router, service)` pairs.
    pub fn dangling_routers(&self) -> Vec<(&str, &str)> {
        self.routers
            .iter()
            .filter(|(_, router)| !self.services.contains_key(&router.service))
            .map(|(name, router)| (name.as_str(), router.service.as_str()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_json_layout() {
        let mut config = RoutingConfiguration::default();
        config.routers.insert(
            "web".to_string(),
            Router {
                service: "web".to_string(),
                rule: "Host(`web`)".to_string(),
                priority: 1,
            },
        );
        config
            .services
            .insert("web".to_string(), Service::single_backend("http://10.0.0.5:80".to_string()));

        let value: serde_json::Value =
            serde_json::from_str(&config.to_dynamic_json().unwrap()).unwrap();

        assert_eq!(value["http"]["routers"]["web"]["rule"], "Host(`web`)");
        assert_eq!(value["http"]["routers"]["web"]["priority"], 1);
        assert_eq!(
            value["http"]["services"]["web"]["loadBalancer"]["servers"][0]["url"],
            "http://10.0.0.5:80"
        );
        assert_eq!(value["http"]["services"]["web"]["loadBalancer"]["passHostHeader"], true);

        let sections: Vec<_> = value.as_object().unwrap().keys().collect();
        assert_eq!(sections, vec!["http"]);
    }

    #[test]
    fn test_dangling_routers() {
        let mut config = RoutingConfiguration::default();
        config.routers.insert(
            "api".to_string(),
            Router { service: "missing".to_string(), rule: String::new(), priority: 1 },
        );

        assert_eq!(config.dangling_routers(), vec![("api", "missing")]);
        assert!(!config.is_empty());
    }
}
