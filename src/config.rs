use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the search/recommendation backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Per-request timeout for backend calls, in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Optional result cap forwarded to the backend as `limit`
    #[serde(default)]
    pub search_limit: Option<u32>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Socket address the presentation API binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
