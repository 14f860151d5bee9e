use crate::domain::{KademliaConfig, SocketAddr};
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Config assembled in code
// ============================================================================

/// Configuration provider built in code.
///
/// Useful for tests and embedding. For deployments, use `TomlConfigProvider`.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    bootstrap_nodes: Vec<SocketAddr>,
    config: KademliaConfig,
}

impl StaticConfigProvider {
    /// Create with default config and no bootstrap nodes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bootstrap_nodes: Vec::new(),
            config: KademliaConfig::default(),
        }
    }

    /// Use the given seed addresses.
    #[must_use]
    pub fn with_bootstrap_nodes(mut self, nodes: Vec<SocketAddr>) -> Self {
        self.bootstrap_nodes = nodes;
        self
    }

    /// Use the given Kademlia config.
    #[must_use]
    pub fn with_config(mut self, config: KademliaConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for StaticConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn kademlia_config(&self) -> KademliaConfig {
        self.config.clone()
    }

    fn bootstrap_nodes(&self) -> Vec<SocketAddr> {
        self.bootstrap_nodes.clone()
    }
}

// ============================================================================
// TomlConfigProvider - File-based config (requires "config" feature)
// ============================================================================

#[cfg(feature = "config")]
mod toml_config {
    use std::fs;
    use std::path::Path;

    use serde::Deserialize;
    use thiserror::Error;

    use super::*;
    use crate::domain::RegistryError;

    /// Configuration file structure.
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct ConfigFile {
        #[serde(default)]
        bootstrap: BootstrapSection,
        #[serde(default)]
        kademlia: KademliaSection,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct BootstrapSection {
        #[serde(default)]
        nodes: Vec<String>,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct KademliaSection {
        k: Option<usize>,
        replacement_capacity: Option<usize>,
    }

    /// Errors that can occur during config loading.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// The file could not be read.
        #[error("failed to read {path}: {source}")]
        Io {
            /// Path of the file that failed to load.
            path: String,
            #[source]
            source: std::io::Error,
        },

        /// The file is not valid TOML or has unexpected keys.
        #[error("failed to parse config: {0}")]
        Parse(String),

        /// A bootstrap entry is not an `ip:port` address.
        #[error("invalid bootstrap address {0:?}")]
        BootstrapAddress(String),

        /// The values parse but the registry cannot run with them.
        #[error(transparent)]
        Invalid(#[from] RegistryError),
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [bootstrap]
    /// nodes = [
    ///     "192.168.1.100:8080",
    ///     "10.0.0.1:8080"
    /// ]
    ///
    /// [kademlia]
    /// k = 20
    /// replacement_capacity = 20
    /// ```
    ///
    /// Both sections are optional. A missing `k` defaults to 20; a missing
    /// `replacement_capacity` defaults to `k`.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        bootstrap_nodes: Vec<SocketAddr>,
        config: KademliaConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read, parsed or validated.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        ///
        /// # Errors
        ///
        /// Returns error on malformed TOML, a malformed bootstrap address or
        /// a config rejected by [`KademliaConfig::validate`].
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let bootstrap_nodes = file
                .bootstrap
                .nodes
                .iter()
                .map(|node| Self::parse_socket_addr(node))
                .collect::<Result<Vec<_>, _>>()?;

            let defaults = KademliaConfig::default();
            let k = file.kademlia.k.unwrap_or(defaults.k);
            let config = KademliaConfig {
                k,
                replacement_capacity: file.kademlia.replacement_capacity.unwrap_or(k),
            };
            config.validate()?;

            Ok(Self {
                bootstrap_nodes,
                config,
            })
        }

        /// Parse a socket address string like "192.168.1.100:8080".
        fn parse_socket_addr(s: &str) -> Result<SocketAddr, ConfigError> {
            s.trim()
                .parse::<std::net::SocketAddr>()
                .map(SocketAddr::from)
                .map_err(|_| ConfigError::BootstrapAddress(s.to_string()))
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn kademlia_config(&self) -> KademliaConfig {
            self.config.clone()
        }

        fn bootstrap_nodes(&self) -> Vec<SocketAddr> {
            self.bootstrap_nodes.clone()
        }
    }
}

#[cfg(feature = "config")]
pub use toml_config::{ConfigError, TomlConfigProvider};
