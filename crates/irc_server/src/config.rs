//! TOML-backed server configuration, loaded the way the teacher's
//! `config.rs` loads it, but shaped around the session core this crate
//! actually implements (registry, liveness watchdog, MOTD) rather than
//! the accept-loop knobs (`max_connections`, anti-flood limits) that are
//! out of scope per spec.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub liveness: LivenessConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    /// Path to an optional MOTD file; an ordered sequence of lines, each
    /// possibly containing a `{nick}` token expanded per-user (§6).
    pub motd_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mantatail".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            motd_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_owned(),
            port: 6667,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LivenessConfig {
    /// Idle time before an unsolicited PING is sent (§4.6).
    pub ping_interval_secs: u64,
    /// Grace period after a PING before a silent client is dropped.
    pub pong_grace_secs: u64,
    /// Recv timeout used while draining the socket during clean close (§4.2).
    pub close_drain_secs: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: 300,
            pong_grace_secs: 5,
            close_drain_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            network: NetworkConfig::default(),
            liveness: LivenessConfig::default(),
        }
    }
}

impl Config {
    /// Loads and parses the TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_str,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.server.name, "mantatail");
        assert_eq!(config.network.port, 6667);
        assert_eq!(config.liveness.ping_interval_secs, 300);
        assert_eq!(config.liveness.pong_grace_secs, 5);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml_src = r#"
            [server]
            name = "testnet"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.server.name, "testnet");
        assert_eq!(config.network.port, 6667);
    }
}
