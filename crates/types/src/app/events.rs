// Path: crates/types/src/app/events.rs
//! Decision events emitted by state transitions for downstream consumers.

use super::{AccountId, BallotStatus, ChainId, KeygenStatus, ObservationType, VoteType};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// An event produced while applying a transition.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// A ballot was created by the first vote on its index.
    BallotCreated {
        /// Ballot index.
        index: String,
        /// Observation type.
        observation_type: ObservationType,
    },
    /// A vote was recorded.
    VoteCast {
        /// Ballot index.
        index: String,
        /// The voting observer.
        voter: AccountId,
        /// The vote.
        vote: VoteType,
    },
    /// A ballot finalized. Emitted exactly once per ballot.
    BallotFinalized {
        /// Ballot index.
        index: String,
        /// Final status.
        status: BallotStatus,
        /// Height of finalization.
        height: u64,
    },
    /// A nonce was assigned to a cctx.
    NonceAllocated {
        /// The chain.
        chain_id: ChainId,
        /// The nonce.
        nonce: u64,
        /// The cctx.
        cctx_index: String,
    },
    /// An inbound ballot finalized but its cctx could not get a nonce.
    /// The finalization stands; the cctx is left unassigned.
    OutboundAllocationFailed {
        /// The cctx, which is also the inbound ballot index.
        cctx_index: String,
        /// The receiver chain.
        chain_id: ChainId,
        /// Error code of the refusal.
        code: String,
    },
    /// A nonce was confirmed on the external chain.
    NonceConfirmed {
        /// The chain.
        chain_id: ChainId,
        /// The nonce.
        nonce: u64,
        /// `nonce_low` after the confirmation.
        nonce_low: u64,
    },
    /// A chain's pending range stopped advancing.
    StuckNonceDetected {
        /// The chain.
        chain_id: ChainId,
        /// The lowest unconfirmed nonce.
        nonce_low: u64,
    },
    /// A keygen ceremony began.
    KeygenStarted {
        /// Target block.
        block_number: u64,
        /// Ceremony counter.
        attempt: u64,
    },
    /// A keygen ceremony ended.
    KeygenCompleted {
        /// Outcome.
        status: KeygenStatus,
        /// The new key, if any.
        tss_pubkey: Option<String>,
    },
    /// A blame record was appended.
    BlameRecorded {
        /// Blame index.
        index: String,
    },
    /// The observer set changed.
    ObserverSetChanged {
        /// New version.
        version: u64,
        /// New size.
        count: u64,
    },
}
