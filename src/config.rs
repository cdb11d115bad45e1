use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 42069;

/// Server settings. Only `port` is read by the core server; the rest
/// configures the bundled handlers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Base URL the `/httpbin/` route proxies to
    pub upstream: String,
    /// Directory holding files served by the `/video` route
    pub assets_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream: "http://httpbin.org".to_string(),
            assets_dir: "assets".to_string(),
        }
    }
}

impl Config {
    /// Loads the YAML file named by `HTTPFROMTCP_CONFIG`, if any, then applies
    /// a `PORT` override from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("HTTPFROMTCP_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(port) = std::env::var("PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid PORT value {:?}", port))?;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("failed to parse config")
    }
}
