//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listen port.
const DEFAULT_PORT: u16 = 3000;

/// Errors reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `LOGBOOK_HOST` is not an IP address
    #[error("invalid LOGBOOK_HOST {value:?}: expected an IP address")]
    InvalidHost { value: String },

    /// `LOGBOOK_PORT` is not a port number
    #[error("invalid LOGBOOK_PORT {value:?}: expected a number from 0 to 65535")]
    InvalidPort { value: String },
}

/// Configuration for the logbook server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// JSON file to persist legs to. `None` keeps them in memory.
    pub store_path: Option<PathBuf>,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            store_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `LOGBOOK_HOST`, `LOGBOOK_PORT`, `LOGBOOK_STORE` and
    /// `LOGBOOK_LOG`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = set("LOGBOOK_HOST") {
            config.host = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost { value })?;
        }

        if let Some(value) = set("LOGBOOK_PORT") {
            config.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?;
        }

        if let Some(value) = set("LOGBOOK_STORE") {
            config.store_path = Some(PathBuf::from(value));
        }

        if let Some(value) = set("LOGBOOK_LOG") {
            config.log_filter = value;
        }

        Ok(config)
    }

    /// The socket address to bind.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
