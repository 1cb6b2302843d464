//! Wire models for the Proxmox VE inventory API.
//!
//! Every payload arrives wrapped in a `{"data": ...}` envelope; these types
//! describe the inner value. Unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Guest flavour. Determines the API path segment used for a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestKind {
    /// QEMU virtual machine
    Qemu,
    /// LXC container
    Lxc,
}

impl GuestKind {
    /// Path segment under `/nodes/<node>/`.
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Qemu => "qemu",
            Self::Lxc => "lxc",
        }
    }
}

impl fmt::Display for GuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Qemu => "VM",
            Self::Lxc => "container",
        })
    }
}

/// `GET /version`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub release: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub repoid: String,
}

/// One entry of `GET /nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub node: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry of `GET /nodes/<node>/qemu` or `/lxc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestSummary {
    #[serde(deserialize_with = "deserialize_vmid")]
    pub vmid: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl GuestSummary {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

/// Guest configuration. Only the free-text description is of interest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestConfig {
    #[serde(default)]
    pub description: String,
}

/// `GET /nodes/<node>/qemu/<vmid>/agent/network-get-interfaces`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentInterfaces {
    #[serde(default)]
    pub result: Vec<AgentInterface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentInterface {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ip-addresses", default)]
    pub ip_addresses: Vec<IpAddress>,
}

impl AgentInterfaces {
    /// All addresses across all interfaces, in reported order.
    pub fn addresses(&self) -> Vec<IpAddress> {
        self.result.iter().flat_map(|iface| iface.ip_addresses.iter().cloned()).collect()
    }
}

/// One entry of `GET /nodes/<node>/lxc/<vmid>/interfaces`.
///
/// Addresses come in CIDR notation (`10.0.0.5/24`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerInterface {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inet: Option<String>,
    #[serde(default)]
    pub inet6: Option<String>,
}

impl ContainerInterface {
    pub fn addresses(&self) -> Vec<IpAddress> {
        let v4 = self.inet.as_deref().map(|cidr| IpAddress::from_cidr(cidr, "ipv4"));
        let v6 = self.inet6.as_deref().map(|cidr| IpAddress::from_cidr(cidr, "ipv6"));
        v4.into_iter().chain(v6).collect()
    }
}

/// A discovered network address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpAddress {
    #[serde(rename = "ip-address", default)]
    pub address: String,
    #[serde(rename = "ip-address-type", default)]
    pub address_type: String,
    #[serde(default)]
    pub prefix: u8,
}

impl IpAddress {
    pub fn new(address: &str, address_type: &str, prefix: u8) -> Self {
        Self { address: address.to_string(), address_type: address_type.to_string(), prefix }
    }

    fn from_cidr(cidr: &str, address_type: &str) -> Self {
        let (address, prefix) = match cidr.split_once('/') {
            Some((addr, len)) => (addr, len.parse().unwrap_or_default()),
            None => (cidr, 0),
        };
        Self::new(address.trim(), address_type, prefix)
    }

    pub fn is_ipv6(&self) -> bool {
        self.address_type.eq_ignore_ascii_case("ipv6") || self.address.contains(':')
    }

    pub fn is_loopback(&self) -> bool {
        self.address.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
    }

    /// Host part of a URL: IPv6 literals are bracketed.
    pub fn url_host(&self) -> String {
        if self.is_ipv6() {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        }
    }
}

/// LXC listings report `vmid` as a string on some releases.
fn deserialize_vmid<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVmid {
        Number(u64),
        Text(String),
    }

    match RawVmid::deserialize(deserializer)? {
        RawVmid::Number(n) => Ok(n),
        RawVmid::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
