use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9697";

fn default_addr() -> String {
    DEFAULT_ADDR.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// e.g. "127.0.0.1:9697"
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Shared authentication token sent with `hello`
    #[serde(default)]
    pub token: String,
    /// Per-read deadline; observed sane range is 2-10 s
    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env");
        let cfg = Self {
            addr: std::env::var("BUILDERPORT_ADDR").unwrap_or_else(|_| default_addr()),
            token: std::env::var("BUILDERPORT_TOKEN").unwrap_or_default(),
            read_timeout_secs: std::env::var("BUILDERPORT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout_secs),
        };

        Ok(cfg)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
