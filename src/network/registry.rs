//! Static name → network mapping. Chain metadata for supported networks is
//! compiled in; custom networks are registered with explicit ids.

use crate::network::config::NetworkConfig;
use anyhow::Result;
use std::collections::HashMap;

/// Error returned when a network name has no registered mapping.
#[derive(Debug)]
pub struct UnknownNetworkError {
    name: String,
}

impl UnknownNetworkError {
    pub fn network_name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UnknownNetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown network: {}", self.name)
    }
}

impl std::error::Error for UnknownNetworkError {}

/// Registry of network configurations, constructed at startup and treated as
/// immutable afterwards. Lookups never touch the network.
#[derive(Debug, Clone)]
pub struct NetworkConfigRegistry {
    networks: HashMap<String, NetworkConfig>,
}

impl Default for NetworkConfigRegistry {
    fn default() -> Self {
        let builtin = [
            NetworkConfig::infura("mainnet", "0x1", "1"),
            NetworkConfig::infura("ropsten", "0x3", "3"),
            NetworkConfig::infura("rinkeby", "0x4", "4"),
            NetworkConfig::infura("kovan", "0x2a", "42"),
            NetworkConfig::infura("goerli", "0x5", "5"),
            NetworkConfig::infura("sepolia", "0xaa36a7", "11155111"),
        ];

        let mut networks = HashMap::new();
        for config in builtin {
            networks.insert(config.name().to_owned(), config);
        }

        Self { networks }
    }
}

impl NetworkConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a user-defined network. Replaces any previous entry with the
    /// same name, including builtins.
    pub fn register_custom(&mut self, config: NetworkConfig) {
        self.networks.insert(config.name().to_owned(), config);
    }

    /// Resolves a network name to its configuration.
    pub fn resolve(&self, name: &str) -> Result<NetworkConfig> {
        self.networks.get(name).cloned().ok_or_else(|| {
            UnknownNetworkError {
                name: name.to_owned(),
            }
            .into()
        })
    }

    /// Registered network names, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }
}
