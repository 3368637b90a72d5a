// Path: crates/types/src/app/observer.rs
//! Observer identities, their node accounts and the crosschain flags.

use super::AccountId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The versioned, ordered set of authorized observers.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct ObserverSet {
    /// Bumped on every membership change.
    pub version: u64,
    /// Observer operator accounts, duplicate-free, in insertion order.
    pub observers: Vec<AccountId>,
    /// Height of the last membership change.
    pub last_change_height: u64,
}

impl ObserverSet {
    /// True if `account` is in the set.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.observers.contains(account)
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True if the set has no observers.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Observer count as of the last membership change.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LastObserverCount {
    /// Number of observers.
    pub count: u64,
    /// Height of the change.
    pub last_change_height: u64,
}

/// Activity status of an observer's node.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    /// Participating in voting and signing.
    #[default]
    Active,
    /// Registered but not participating.
    Inactive,
}

/// Public keys of a grantee used for day-to-day signing.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct PubKeySet {
    /// Compressed secp256k1 public key, hex.
    pub secp256k1: String,
    /// Ed25519 public key, hex.
    pub ed25519: String,
}

/// Registry entry for one observer.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct NodeAccount {
    /// The observer's operator identity.
    pub operator: AccountId,
    /// The delegated identity that submits votes on the operator's behalf.
    pub grantee_address: AccountId,
    /// The grantee's public keys.
    pub grantee_pubkey: PubKeySet,
    /// Node status.
    pub node_status: NodeStatus,
    /// Delegated stake, used as voting weight when weighted voting is enabled.
    pub delegation: u64,
}

/// Global switches gating new inbound and outbound work.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrosschainFlags {
    /// Accept inbound observations.
    pub is_inbound_enabled: bool,
    /// Allocate nonces for outbound transactions.
    pub is_outbound_enabled: bool,
}

impl Default for CrosschainFlags {
    fn default() -> Self {
        Self {
            is_inbound_enabled: true,
            is_outbound_enabled: true,
        }
    }
}
