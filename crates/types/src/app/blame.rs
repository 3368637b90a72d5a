// Path: crates/types/src/app/blame.rs
//! Failure attribution records.

use super::ChainId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A participant implicated in a failure.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct BlameNode {
    /// Public key (or account hex) of the node.
    pub pub_key: String,
    /// Evidence payload.
    #[serde(default)]
    pub blame_data: Vec<u8>,
    /// Signature over the evidence.
    #[serde(default)]
    pub blame_signature: Vec<u8>,
}

impl BlameNode {
    /// A node entry with no evidence attached.
    pub fn named(pub_key: impl Into<String>) -> Self {
        Self {
            pub_key: pub_key.into(),
            ..Default::default()
        }
    }
}

/// An immutable failure record.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Blame {
    /// Unique index.
    pub index: String,
    /// Human-readable reason.
    pub failure_reason: String,
    /// Implicated nodes.
    pub nodes: Vec<BlameNode>,
}

/// Index of a blame raised for a keysign round on `(chain, nonce)`.
pub fn keysign_blame_index(chain_id: ChainId, nonce: u64, digest: &str) -> String {
    format!("{}{}", keysign_blame_prefix(chain_id, nonce), digest)
}

/// Shared prefix of every keysign blame index for `(chain, nonce)`.
pub fn keysign_blame_prefix(chain_id: ChainId, nonce: u64) -> String {
    format!("keysign-{}-{}-", chain_id, nonce)
}

/// Index of a blame raised for a failed keygen ceremony.
pub fn keygen_blame_index(attempt: u64, block_number: u64) -> String {
    format!("keygen-{}-{}", attempt, block_number)
}

/// Index of a blame raised for a ballot that finalized as failure.
pub fn ballot_blame_index(ballot_index: &str) -> String {
    format!("ballot-{}", ballot_index)
}
