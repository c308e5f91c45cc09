//! Server configuration.
//!
//! Configuration is read from a YAML file:
//!
//! ```yaml
//! server:
//!   listen_addr: "127.0.0.1:8080"
//!   recv_timeout_ms: 5000
//! virtual_hosts:
//!   website1: ./demo/example
//!   "localhost:8080": ./demo
//! directory_listing: true
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.
//! The `LISTEN` environment variable overrides `server.listen_addr`.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file used by [`Config::load`].
pub const CONFIG_ENV: &str = "MINIHTTP_CONFIG";

/// Environment variable overriding the listen address.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Host header value to document root.
    pub virtual_hosts: HashMap<String, PathBuf>,
    /// Serve an HTML index for directories without an `index.html`.
    pub directory_listing: bool,
}

/// Listener and per-connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Idle timeout of a connection, in milliseconds.
    pub recv_timeout_ms: u64,
    /// Bytes reserved for each socket read.
    pub recv_buf_size: usize,
    /// Largest request head accepted before the blank line arrives.
    pub max_frame_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            recv_timeout_ms: 5000,
            recv_buf_size: 1024,
            max_frame_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }
}

impl Config {
    /// Loads the file named by `MINIHTTP_CONFIG`, or the defaults when it is
    /// unset, then applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(std::env::var_os(CONFIG_ENV))
    }

    /// Loads `path`, or the defaults when `None`, then applies the `LISTEN`
    /// override.
    pub fn load_from(path: Option<impl AsRef<Path>>) -> anyhow::Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config {}", path.display()))?;
        let cfg = Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document, but every field has a default
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.listen_addr.is_empty() {
            bail!("server.listen_addr must not be empty");
        }
        if self.server.recv_timeout_ms == 0 {
            bail!("server.recv_timeout_ms must be greater than zero");
        }
        if self.server.recv_buf_size == 0 {
            bail!("server.recv_buf_size must be greater than zero");
        }
        if self.server.max_frame_size == 0 {
            bail!("server.max_frame_size must be greater than zero");
        }
        Ok(())
    }
}
