//! Configured chains and the catalog that holds them.
//!
//! The catalog is loaded once at startup and never mutated. Each [`Chain`]
//! carries its RPC endpoints in priority order: the connector takes the
//! first one that passes the liveness probe.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A Polkadot-family chain watched for governance events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Display name and identity (e.g. `"Polkadot"`). Registrations refer
    /// to chains by this name.
    pub name: String,

    /// Whether the chain is a relay chain.
    #[serde(default)]
    pub is_relay: bool,

    /// RPC websocket endpoints in priority order.
    pub endpoints: Vec<String>,

    /// Logo used as the webhook avatar for this chain's notifications.
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Chain {
    /// Creates a chain with the given name and endpoints.
    #[must_use]
    pub fn new(name: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            is_relay: false,
            endpoints,
            logo_url: None,
        }
    }

    /// Subdomain used by Subscan for this chain.
    #[must_use]
    pub fn subscan_slug(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Webhook display name for this chain's notifications.
    #[must_use]
    pub fn webhook_username(&self) -> String {
        format!("{} Governance Notify", self.name)
    }
}

/// Immutable set of configured chains, unique by name.
#[derive(Debug, Clone)]
pub struct ChainCatalog {
    chains: Vec<Chain>,
}

impl ChainCatalog {
    /// Builds a catalog, rejecting empty or duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChains`] if a name is empty or used twice.
    pub fn new(chains: Vec<Chain>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for chain in &chains {
            if chain.name.trim().is_empty() {
                return Err(ConfigError::InvalidChains("chain with empty name".to_string()));
            }
            if !seen.insert(chain.name.as_str()) {
                return Err(ConfigError::InvalidChains(format!(
                    "chain {} defined twice",
                    chain.name
                )));
            }
        }
        Ok(Self { chains })
    }

    /// Built-in Polkadot and Kusama definitions.
    #[must_use]
    pub fn builtin() -> Self {
        let polkadot = Chain {
            name: "Polkadot".to_string(),
            is_relay: true,
            endpoints: vec![
                "wss://rpc.polkadot.io".to_string(),
                "wss://polkadot-rpc.dwellir.com".to_string(),
                "wss://rpc.ibp.network/polkadot".to_string(),
            ],
            logo_url: None,
        };
        let kusama = Chain {
            name: "Kusama".to_string(),
            is_relay: true,
            endpoints: vec![
                "wss://kusama-rpc.polkadot.io".to_string(),
                "wss://kusama-rpc.dwellir.com".to_string(),
                "wss://rpc.ibp.network/kusama".to_string(),
            ],
            logo_url: None,
        };
        Self {
            chains: vec![polkadot, kusama],
        }
    }

    /// Parses a JSON array of chains.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input or
    /// [`ConfigError::InvalidChains`] if the list breaks a catalog invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let chains: Vec<Chain> = serde_json::from_str(json)?;
        Self::new(chains)
    }

    /// Loads the catalog from `path`, or the built-in chains when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any error
    /// from [`ChainCatalog::from_json`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Looks up a chain by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|chain| chain.name == name)
    }

    /// All chains in configuration order.
    #[must_use]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Number of configured chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if no chain is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
