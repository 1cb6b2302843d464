//! Domain models.

pub mod config;
pub mod duration;
pub mod inventory;
pub mod routing;
pub mod service;

pub use config::{
    ApiLogLevel, ProviderConfig, ProviderSettings, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use duration::GoDuration;
pub use inventory::{
    AgentInterface, AgentInterfaces, ContainerInterface, GuestConfig, GuestKind, GuestSummary,
    IpAddress, NodeStatus, Version,
};
pub use routing::{LoadBalancer, Router, RoutingConfiguration, Server, Service};
pub use service::{Catalog, DiscoveredService};
