pub mod rpc;
pub mod ss58;
pub mod storage;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::ChainDescriptor;

pub use rpc::SubstrateRpcClient;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
    #[error("failed to decode {item}: {reason}")]
    Decode { item: &'static str, reason: String },
    #[error("unsupported RPC endpoint {0}")]
    UnsupportedEndpoint(String),
}

/// Current collator set of one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollatorSnapshot {
    pub invulnerables: Vec<String>,
    pub candidates: Vec<String>,
    /// Candidate deposits in the chain's smallest unit.
    pub deposits: HashMap<String, u128>,
}

impl CollatorSnapshot {
    pub fn is_invulnerable(&self, address: &str) -> bool {
        self.invulnerables.iter().any(|a| a == address)
    }

    pub fn is_candidate(&self, address: &str) -> bool {
        self.candidates.iter().any(|a| a == address)
    }

    pub fn deposit_of(&self, address: &str) -> Option<u128> {
        self.deposits.get(address).copied()
    }

    /// Invulnerables followed by candidates.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.invulnerables
            .iter()
            .chain(self.candidates.iter())
            .map(String::as_str)
    }
}

#[async_trait]
pub trait CollatorSource: Send + Sync {
    async fn fetch_snapshot(&self, chain: &ChainDescriptor) -> Result<CollatorSnapshot, ChainError>;
}
