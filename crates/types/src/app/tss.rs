// Path: crates/types/src/app/tss.rs
//! TSS keys and key-generation ceremonies.

use super::ChainId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A finalized threshold-signature key.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tss {
    /// The shared public key.
    pub tss_pubkey: String,
    /// Grantee pubkeys that took part in the ceremony.
    pub tss_participant_list: Vec<String>,
    /// Operator accounts of the participants, hex.
    pub operator_address_list: Vec<String>,
    /// Block the ceremony targeted.
    pub keygen_height: u64,
    /// Height at which the key became current.
    pub finalized_height: u64,
}

/// Status of a key-generation ceremony.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeygenStatus {
    /// Waiting for the ceremony outcome.
    #[default]
    Pending,
    /// A key was produced.
    Success,
    /// The ceremony failed.
    Failed,
}

/// The single key-generation ceremony record.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Keygen {
    /// Ceremony status.
    pub status: KeygenStatus,
    /// Grantee pubkeys expected to participate.
    pub grantee_pubkeys: Vec<String>,
    /// Block the ceremony targets.
    pub block_number: u64,
    /// Ceremonies started so far, including this one.
    pub attempt: u64,
}

/// Tracks the cctx that moves a chain's funds to a new TSS address.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct TssFundMigratorInfo {
    /// The chain being migrated.
    pub chain_id: ChainId,
    /// The migration cctx.
    pub migration_cctx_index: String,
}
