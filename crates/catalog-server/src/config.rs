//! Server configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `CATALOG_DATA_PATH` | `products.json` | backing file for the catalog |
//! | `CATALOG_BIND` | `0.0.0.0` | listen address for both listeners |
//! | `CATALOG_PORT` | `3000` | HTTP port (REST routes and `/ws`) |
//! | `CATALOG_WS_PORT` | `8080` | dedicated broadcast listener port |
//! | `CATALOG_STATIC_DIR` | unset | directory served for unmatched paths |
//! | `CATALOG_ID_POLICY` | `max-plus-one` | `max-plus-one` or `monotonic` |
//! | `CATALOG_OUTBOUND_CAPACITY` | `64` | queued messages per connection |

use std::path::PathBuf;
use std::str::FromStr;

use catalog_core::IdAllocation;

use crate::hub::HubConfig;

/// A configuration value that could not be used.
#[derive(Debug, thiserror::Error)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_path: PathBuf,
    pub bind: String,
    pub port: u16,
    pub ws_port: u16,
    pub static_dir: Option<PathBuf>,
    pub id_policy: IdAllocation,
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            data_path: PathBuf::from("products.json"),
            bind: "0.0.0.0".to_string(),
            port: 3000,
            ws_port: 8080,
            static_dir: None,
            id_policy: IdAllocation::default(),
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(path) = lookup("CATALOG_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(bind) = lookup("CATALOG_BIND") {
            config.bind = bind;
        }
        if let Some(raw) = lookup("CATALOG_PORT") {
            config.port = parse("CATALOG_PORT", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_WS_PORT") {
            config.ws_port = parse("CATALOG_WS_PORT", &raw)?;
        }
        config.static_dir = lookup("CATALOG_STATIC_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        if let Some(raw) = lookup("CATALOG_ID_POLICY") {
            config.id_policy = parse("CATALOG_ID_POLICY", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_OUTBOUND_CAPACITY") {
            let capacity: usize = parse("CATALOG_OUTBOUND_CAPACITY", &raw)?;
            if capacity == 0 {
                return Err(ConfigError {
                    key: "CATALOG_OUTBOUND_CAPACITY",
                    value: raw,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.hub.outbound_capacity = capacity;
        }

        Ok(config)
    }

    /// Address of the main HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Address of the dedicated broadcast listener, or `None` when it would
    /// collide with the HTTP listener (the `/ws` route still serves it).
    pub fn broadcast_addr(&self) -> Option<String> {
        (self.ws_port != self.port).then(|| format!("{}:{}", self.bind, self.ws_port))
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError {
        key,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}
