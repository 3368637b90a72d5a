// Path: crates/types/src/app/nonce.rs
//! Per-chain nonce bookkeeping.

use super::{AccountId, ChainId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The next nonce to assign on a chain.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainNonces {
    /// The chain.
    pub chain_id: ChainId,
    /// Next nonce to assign. Never decreases except through governance reset.
    pub nonce: u64,
    /// Signers of the last update.
    pub signers: Vec<AccountId>,
    /// Height of the last update.
    pub finalized_height: u64,
}

/// Nonces assigned but not yet confirmed: the half-open range `[nonce_low, nonce_high)`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingNonces {
    /// The chain.
    pub chain_id: ChainId,
    /// Lowest unconfirmed nonce.
    pub nonce_low: u64,
    /// One past the highest assigned nonce.
    pub nonce_high: u64,
    /// TSS public key the range was allocated under.
    pub tss: String,
    /// Nonces confirmed out of order, sorted, all strictly inside the range.
    pub held: Vec<u64>,
    /// Height at which `nonce_low` last moved or the range last became non-empty.
    pub last_advance_height: u64,
}

impl PendingNonces {
    /// True if no nonce is outstanding.
    pub fn is_empty(&self) -> bool {
        self.nonce_low >= self.nonce_high
    }

    /// True if `nonce` is inside `[nonce_low, nonce_high)`.
    pub fn contains(&self, nonce: u64) -> bool {
        nonce >= self.nonce_low && nonce < self.nonce_high
    }

    /// Number of outstanding nonces.
    pub fn len(&self) -> u64 {
        self.nonce_high.saturating_sub(self.nonce_low)
    }
}

/// The cctx that consumed a nonce. Write-once.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct NonceToCctx {
    /// The chain.
    pub chain_id: ChainId,
    /// The nonce.
    pub nonce: u64,
    /// Index of the cross-chain transaction.
    pub cctx_index: String,
    /// TSS public key the nonce was allocated under.
    pub tss: String,
}
