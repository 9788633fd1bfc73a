use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ServerResult;

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_DATA_KEY: &str = "dashboardData";

/// Server settings.
///
/// Read from an optional TOML file, then overridden by `SERVDASH_*`
/// environment variables. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory for the file-backed store; in-memory when unset.
    pub data_dir: Option<PathBuf>,
    pub data_key: String,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8788)),
            data_dir: None,
            data_key: DEFAULT_DATA_KEY.to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path` (if any), then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// [`load`](Self::load) with environment variables read through `lookup`.
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        Ok(config)
    }

    /// Apply `SERVDASH_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("SERVDASH_BIND") {
            match addr.parse() {
                Ok(parsed) => self.bind_addr = parsed,
                Err(_) => warn!(value = %addr, "invalid SERVDASH_BIND, keeping {}", self.bind_addr),
            }
        }

        if let Some(dir) = lookup("SERVDASH_DATA_DIR") {
            self.data_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }

        if let Some(key) = lookup("SERVDASH_DATA_KEY") {
            if !key.is_empty() {
                self.data_key = key;
            }
        }

        if let Some(val) = lookup("SERVDASH_MAX_BODY_BYTES") {
            match val.parse() {
                Ok(n) => self.max_body_bytes = n,
                Err(_) => warn!(value = %val, "invalid SERVDASH_MAX_BODY_BYTES, using default"),
            }
        }
    }
}
