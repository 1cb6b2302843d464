use crate::error::ClientError;
use crate::types::ClientConfig;
use proxmox_provider_types::models::{
    AgentInterfaces, ContainerInterface, GuestConfig, GuestKind, GuestSummary, NodeStatus, Version,
};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

const API_PREFIX: &str = "/api2/json";

/// Every API payload is wrapped in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct ProxmoxClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl ProxmoxClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                config.base_url,
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .user_agent(concat!("proxmox-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = format!("{}{}", config.base_url.trim_end_matches('/'), API_PREFIX);
        if config.debug {
            tracing::debug!("Creating Proxmox client with base URL: {}", base_url);
        }

        Ok(Self { client, base_url, config })
    }

    /// `GET /version`
    pub async fn version(&self) -> Result<Version, ClientError> {
        self.get("/version").await
    }

    /// `GET /nodes`
    pub async fn nodes(&self) -> Result<Vec<NodeStatus>, ClientError> {
        self.get("/nodes").await
    }

    /// `GET /nodes/<node>/qemu` or `/nodes/<node>/lxc`
    pub async fn guests(&self, node: &str, kind: GuestKind) -> Result<Vec<GuestSummary>, ClientError> {
        self.get(&format!("/nodes/{}/{}", node, kind.api_path())).await
    }

    /// `GET /nodes/<node>/<kind>/<vmid>/config`
    pub async fn guest_config(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: u64,
    ) -> Result<GuestConfig, ClientError> {
        self.get(&format!("/nodes/{}/{}/{}/config", node, kind.api_path(), vmid)).await
    }

    /// Interfaces reported by the QEMU guest agent.
    pub async fn agent_interfaces(
        &self,
        node: &str,
        vmid: u64,
    ) -> Result<AgentInterfaces, ClientError> {
        self.get(&format!("/nodes/{}/qemu/{}/agent/network-get-interfaces", node, vmid)).await
    }

    /// Interfaces of a running LXC container.
    pub async fn container_interfaces(
        &self,
        node: &str,
        vmid: u64,
    ) -> Result<Vec<ContainerInterface>, ClientError> {
        self.get(&format!("/nodes/{}/lxc/{}/interfaces", node, vmid)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        if self.config.debug {
            tracing::debug!("API Request: GET {}", url);
        }

        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        let body = resp.text().await?;
        if self.config.debug {
            tracing::debug!("API Response: {}", body);
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", path, e)))
    }

    fn auth_header(&self) -> String {
        format!("PVEAPIToken={}={}", self.config.token_id, self.config.token)
    }
}
