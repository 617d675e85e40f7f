//! Storage keys and SCALE layouts of the `CollatorSelection` pallet.

use parity_scale_codec::{Decode, DecodeAll, Encode};
use std::hash::Hasher;
use twox_hash::XxHash64;

use super::ChainError;

pub const PALLET: &str = "CollatorSelection";
pub const INVULNERABLES: &str = "Invulnerables";
pub const CANDIDATE_LIST: &str = "CandidateList";

pub type AccountId = [u8; 32];

/// One entry of `CollatorSelection::CandidateList`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CandidateInfo {
    pub who: AccountId,
    pub deposit: u128,
}

pub fn twox_128(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (seed, chunk) in out.chunks_exact_mut(8).enumerate() {
        let mut hasher = XxHash64::with_seed(seed as u64);
        hasher.write(data);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes());
    }
    out
}

/// Hex key of a plain `StorageValue` item.
pub fn storage_value_key(pallet: &str, item: &str) -> String {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    format!("0x{}", hex::encode(key))
}

pub fn decode_hex(item: &'static str, raw: &str) -> Result<Vec<u8>, ChainError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| ChainError::Decode {
        item,
        reason: format!("invalid hex: {e}"),
    })
}

pub fn decode_invulnerables(bytes: &[u8]) -> Result<Vec<AccountId>, ChainError> {
    Vec::<AccountId>::decode_all(&mut &bytes[..]).map_err(|e| ChainError::Decode {
        item: INVULNERABLES,
        reason: e.to_string(),
    })
}

pub fn decode_candidates(bytes: &[u8]) -> Result<Vec<CandidateInfo>, ChainError> {
    Vec::<CandidateInfo>::decode_all(&mut &bytes[..]).map_err(|e| ChainError::Decode {
        item: CANDIDATE_LIST,
        reason: e.to_string(),
    })
}
