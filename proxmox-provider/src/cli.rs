use clap::Parser;
use proxmox_provider_types::ProviderConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "proxmox-provider",
    about = "Publishes Traefik dynamic configuration for labelled Proxmox VE guests",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(short, long, env = "PROXMOX_PROVIDER_CONFIG", help = "JSON file with provider options")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PROXMOX_POLL_INTERVAL", help = "Time between passes, e.g. 30s or 1m")]
    pub poll_interval: Option<String>,

    #[arg(long, env = "PROXMOX_API_ENDPOINT", help = "Proxmox VE API URL")]
    pub api_endpoint: Option<String>,

    #[arg(long, env = "PROXMOX_API_TOKEN_ID", help = "API token ID, e.g. root@pam!traefik")]
    pub api_token_id: Option<String>,

    #[arg(long, env = "PROXMOX_API_TOKEN", hide_env_values = true, help = "API token secret")]
    pub api_token: Option<String>,

    #[arg(long, env = "PROXMOX_API_LOGGING", help = "API request logging: info or debug")]
    pub api_logging: Option<String>,

    #[arg(long, env = "PROXMOX_API_VALIDATE_SSL", help = "Verify the API certificate: true or false")]
    pub api_validate_ssl: Option<String>,

    #[arg(short, long, help = "Write each snapshot to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Publish the first snapshot and exit")]
    pub once: bool,

    #[arg(short, long, env = "PROXMOX_PROVIDER_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PROXMOX_PROVIDER_LOG_DIR", help = "Also write daily log files here")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Overlay flags and environment variables onto options loaded from file.
    pub fn apply(&self, mut config: ProviderConfig) -> ProviderConfig {
        let overrides = [
            (&self.poll_interval, &mut config.poll_interval),
            (&self.api_endpoint, &mut config.api_endpoint),
            (&self.api_token_id, &mut config.api_token_id),
            (&self.api_token, &mut config.api_token),
            (&self.api_logging, &mut config.api_logging),
            (&self.api_validate_ssl, &mut config.api_validate_ssl),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let cli = Cli::parse_from([
            "proxmox-provider",
            "--api-endpoint",
            "https://pve2.example.com:8006",
            "--poll-interval",
            "1m",
        ]);
        let file = ProviderConfig {
            api_endpoint: "https://pve1.example.com:8006".to_string(),
            api_token_id: "root@pam!traefik".to_string(),
            ..Default::default()
        };

        let config = cli.apply(file);

        assert_eq!(config.api_endpoint, "https://pve2.example.com:8006");
        assert_eq!(config.poll_interval, "1m");
        assert_eq!(config.api_token_id, "root@pam!traefik");
        assert_eq!(config.api_validate_ssl, "true");
    }

    #[test]
    fn test_once_and_output() {
        let cli = Cli::parse_from(["proxmox-provider", "--once", "-o", "/tmp/proxmox.json"]);
        assert!(cli.once);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/proxmox.json")));
    }
}
