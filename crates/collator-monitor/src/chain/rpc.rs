use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use url::Url;

use super::storage::{self, CANDIDATE_LIST, INVULNERABLES, PALLET};
use super::{ss58, ChainError, CollatorSnapshot, CollatorSource};
use crate::config::ChainDescriptor;

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// Reads `CollatorSelection` storage from a Substrate node over JSON-RPC.
#[derive(Debug)]
pub struct SubstrateRpcClient {
    client: Client,
    next_id: AtomicU64,
}

impl SubstrateRpcClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Maps a node URL onto the HTTP endpoint served on the same port.
    pub fn http_endpoint(rpc_url: &str) -> Result<Url, ChainError> {
        let mut url =
            Url::parse(rpc_url).map_err(|_| ChainError::UnsupportedEndpoint(rpc_url.to_string()))?;
        let scheme = match url.scheme() {
            "wss" | "https" => "https",
            "ws" | "http" => "http",
            _ => return Err(ChainError::UnsupportedEndpoint(rpc_url.to_string())),
        };
        url.set_scheme(scheme)
            .map_err(|_| ChainError::UnsupportedEndpoint(rpc_url.to_string()))?;
        Ok(url)
    }

    async fn call(&self, endpoint: &Url, method: &str, params: Vec<Value>) -> Result<Value, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let transport = |source| ChainError::Transport {
            url: endpoint.to_string(),
            source,
        };
        let response = self
            .client
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        let body = response.text().await.map_err(transport)?;

        let parsed: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| ChainError::InvalidResponse(format!("{method}: {e}")))?;
        if let Some(error) = parsed.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    /// Raw SCALE bytes of a storage value, `None` when the item is unset.
    async fn get_storage(
        &self,
        endpoint: &Url,
        item: &'static str,
    ) -> Result<Option<Vec<u8>>, ChainError> {
        let key = storage::storage_value_key(PALLET, item);
        debug!("state_getStorage {PALLET}::{item} ({key}) at {endpoint}");
        match self
            .call(endpoint, "state_getStorage", vec![Value::String(key)])
            .await?
        {
            Value::Null => Ok(None),
            Value::String(raw) => storage::decode_hex(item, &raw).map(Some),
            other => Err(ChainError::InvalidResponse(format!(
                "{PALLET}::{item}: expected hex string, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl CollatorSource for SubstrateRpcClient {
    async fn fetch_snapshot(&self, chain: &ChainDescriptor) -> Result<CollatorSnapshot, ChainError> {
        let endpoint = Self::http_endpoint(&chain.rpc_url)?;

        let invulnerables = match self.get_storage(&endpoint, INVULNERABLES).await? {
            Some(bytes) => storage::decode_invulnerables(&bytes)?,
            None => Vec::new(),
        };
        let candidates = match self.get_storage(&endpoint, CANDIDATE_LIST).await? {
            Some(bytes) => storage::decode_candidates(&bytes)?,
            None => Vec::new(),
        };

        let mut snapshot = CollatorSnapshot {
            invulnerables: invulnerables
                .iter()
                .map(|account| ss58::encode(account, chain.ss58_prefix))
                .collect(),
            ..Default::default()
        };
        for candidate in candidates {
            let address = ss58::encode(&candidate.who, chain.ss58_prefix);
            snapshot.deposits.insert(address.clone(), candidate.deposit);
            snapshot.candidates.push(address);
        }

        debug!(
            "{}: {} invulnerables, {} candidates",
            chain.name,
            snapshot.invulnerables.len(),
            snapshot.candidates.len()
        );
        Ok(snapshot)
    }
}
