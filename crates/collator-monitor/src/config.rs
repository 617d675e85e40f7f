use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chain::ss58;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read chain config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse chain config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid chain entry `{chain}`: {reason}")]
    InvalidChain { chain: String, reason: String },
}

/// Relay chain ecosystem a system parachain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainNetwork {
    Polkadot,
    Kusama,
}

impl ChainNetwork {
    pub const fn default_ss58_prefix(&self) -> u16 {
        match self {
            Self::Polkadot => 0,
            Self::Kusama => 2,
        }
    }

    pub const fn default_token_symbol(&self) -> &'static str {
        match self {
            Self::Polkadot => "DOT",
            Self::Kusama => "KSM",
        }
    }

    pub const fn default_token_decimals(&self) -> u8 {
        match self {
            Self::Polkadot => 10,
            Self::Kusama => 12,
        }
    }
}

impl fmt::Display for ChainNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polkadot => write!(f, "POLKADOT"),
            Self::Kusama => write!(f, "KUSAMA"),
        }
    }
}

/// A single chain entry as it appears in the config file.
#[derive(Debug, Clone, Deserialize)]
struct ChainEntry {
    name: String,
    rpc_url: String,
    collator_file: PathBuf,
    #[serde(default)]
    discord_webhook_url: Option<String>,
    #[serde(default)]
    ss58_prefix: Option<u16>,
    #[serde(default)]
    token_symbol: Option<String>,
    #[serde(default)]
    token_decimals: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawChainsConfig {
    polkadot_chains: Vec<ChainEntry>,
    kusama_chains: Vec<ChainEntry>,
}

/// Everything needed to check one chain, with defaults already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub name: String,
    pub rpc_url: String,
    /// Address registry for this chain, resolved against the config file's directory.
    pub registry_file: PathBuf,
    pub network: ChainNetwork,
    pub webhook_url: Option<String>,
    pub ss58_prefix: u16,
    pub token_symbol: String,
    pub token_decimals: u8,
}

impl ChainDescriptor {
    fn from_entry(
        entry: ChainEntry,
        network: ChainNetwork,
        base_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidChain {
            chain: entry.name.clone(),
            reason,
        };

        if entry.name.trim().is_empty() {
            return Err(ConfigError::InvalidChain {
                chain: entry.rpc_url.clone(),
                reason: "name must not be empty".to_string(),
            });
        }

        let url = Url::parse(&entry.rpc_url)
            .map_err(|e| invalid(format!("rpc_url `{}` is not a valid URL: {e}", entry.rpc_url)))?;
        if !matches!(url.scheme(), "ws" | "wss" | "http" | "https") {
            return Err(invalid(format!(
                "rpc_url scheme `{}` is not supported (expected ws, wss, http or https)",
                url.scheme()
            )));
        }

        if entry.collator_file.as_os_str().is_empty() {
            return Err(invalid("collator_file must not be empty".to_string()));
        }

        let ss58_prefix = entry
            .ss58_prefix
            .unwrap_or_else(|| network.default_ss58_prefix());
        if ss58_prefix > ss58::MAX_PREFIX {
            return Err(invalid(format!(
                "ss58_prefix {ss58_prefix} exceeds {}",
                ss58::MAX_PREFIX
            )));
        }

        let registry_file = if entry.collator_file.is_absolute() {
            entry.collator_file.clone()
        } else {
            base_dir.join(&entry.collator_file)
        };

        let webhook_url = entry
            .discord_webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            name: entry.name.clone(),
            rpc_url: entry.rpc_url.clone(),
            registry_file,
            network,
            webhook_url,
            ss58_prefix,
            token_symbol: entry
                .token_symbol
                .clone()
                .unwrap_or_else(|| network.default_token_symbol().to_string()),
            token_decimals: entry
                .token_decimals
                .unwrap_or_else(|| network.default_token_decimals()),
        })
    }
}

/// The two ordered chain groups to check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainsConfig {
    pub polkadot_chains: Vec<ChainDescriptor>,
    pub kusama_chains: Vec<ChainDescriptor>,
}

impl ChainsConfig {
    /// Load and validate the chain list. Any failure here is fatal for the run.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&contents, base_dir).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse a chain list; relative registry paths are joined onto `base_dir`.
    pub fn from_json_str(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawChainsConfig =
            serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        let convert = |entries: Vec<ChainEntry>, network: ChainNetwork| {
            entries
                .into_iter()
                .map(|entry| ChainDescriptor::from_entry(entry, network, base_dir))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            polkadot_chains: convert(raw.polkadot_chains, ChainNetwork::Polkadot)?,
            kusama_chains: convert(raw.kusama_chains, ChainNetwork::Kusama)?,
        })
    }

    /// Chains in processing order: the Polkadot group, then the Kusama group.
    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.polkadot_chains.iter().chain(self.kusama_chains.iter())
    }

    pub fn len(&self) -> usize {
        self.polkadot_chains.len() + self.kusama_chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_webhook_url(&self) -> Option<&str> {
        self.iter().find_map(|chain| chain.webhook_url.as_deref())
    }
}
