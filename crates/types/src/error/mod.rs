// Path: crates/types/src/error/mod.rs
//! Core error types for the observer core.

use crate::app::{AccountId, ChainId};
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors related to the state store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The requested key was not found in the state.
    #[error("Key not found in state")]
    KeyNotFound,
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// An error occurred while writing to the state.
    #[error("State write error: {0}")]
    WriteError(String),
    /// The provided value was invalid.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred during state deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Applying a state change failed.
    #[error("Apply failed: {0}")]
    Apply(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "STATE_KEY_NOT_FOUND",
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::WriteError(_) => "STATE_WRITE_ERROR",
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
            Self::Apply(_) => "STATE_APPLY_FAILED",
        }
    }
}

/// Errors raised by the ballot box and the observer registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The voter is not part of the ballot's voter list.
    #[error("Voter {0} is not in the ballot's voter list")]
    UnknownVoter(AccountId),
    /// The voter already cast a vote on this ballot.
    #[error("Voter {0} has already voted on this ballot")]
    AlreadyVoted(AccountId),
    /// The ballot is no longer accepting votes.
    #[error("Ballot {0} is already finalized")]
    BallotFinalized(String),
    /// `NotYetVoted` was submitted as a vote.
    #[error("NotYetVoted is not a castable vote")]
    InvalidVote,
    /// No ballot exists under the given index.
    #[error("Ballot {0} not found")]
    BallotNotFound(String),
    /// A ballot would have no voters or no voting weight.
    #[error("Ballot voter list is empty or carries no weight")]
    EmptyVoterList,
    /// The voter weight vector does not line up with the voter list.
    #[error("Voter weights length {weights} does not match voter list length {voters}")]
    WeightsMismatch {
        /// Number of voters.
        voters: usize,
        /// Number of weights.
        weights: usize,
    },
    /// The account is not an authorized observer.
    #[error("Account {0} is not an observer")]
    NotAnObserver(AccountId),
    /// The observer is already registered.
    #[error("Observer {0} already exists")]
    ObserverAlreadyExists(AccountId),
    /// The observer's node account is inactive.
    #[error("Observer {0} is inactive")]
    ObserverInactive(AccountId),
    /// Inbound observation is disabled by the crosschain flags.
    #[error("Inbound observation is disabled")]
    InboundDisabled,
    /// An existing ballot was addressed with a different observation type.
    #[error("Ballot {index} exists with observation type {existing}, got {requested}")]
    ObservationTypeMismatch {
        /// The ballot index.
        index: String,
        /// The type the ballot was created with.
        existing: String,
        /// The type supplied by the caller.
        requested: String,
    },
}

impl ErrorCode for ObserverError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownVoter(_) => "OBSERVER_UNKNOWN_VOTER",
            Self::AlreadyVoted(_) => "OBSERVER_ALREADY_VOTED",
            Self::BallotFinalized(_) => "OBSERVER_BALLOT_FINALIZED",
            Self::InvalidVote => "OBSERVER_INVALID_VOTE",
            Self::BallotNotFound(_) => "OBSERVER_BALLOT_NOT_FOUND",
            Self::EmptyVoterList => "OBSERVER_EMPTY_VOTER_LIST",
            Self::WeightsMismatch { .. } => "OBSERVER_WEIGHTS_MISMATCH",
            Self::NotAnObserver(_) => "OBSERVER_NOT_AN_OBSERVER",
            Self::ObserverAlreadyExists(_) => "OBSERVER_ALREADY_EXISTS",
            Self::ObserverInactive(_) => "OBSERVER_INACTIVE",
            Self::InboundDisabled => "OBSERVER_INBOUND_DISABLED",
            Self::ObservationTypeMismatch { .. } => "OBSERVER_OBSERVATION_TYPE_MISMATCH",
        }
    }
}

/// Errors raised by the nonce allocator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NonceError {
    /// No enabled chain params exist for the chain.
    #[error("Chain {0} is not supported")]
    ChainNotSupported(ChainId),
    /// Outbound allocation is disabled by the crosschain flags.
    #[error("Outbound transactions are disabled")]
    OutboundDisabled,
    /// The nonce is outside the pending range or was already confirmed.
    #[error("Nonce {nonce} is not pending on chain {chain_id}")]
    NonceNotPending {
        /// The chain.
        chain_id: ChainId,
        /// The nonce that was confirmed.
        nonce: u64,
    },
    /// The pending range has not advanced within the staleness window.
    #[error("Chain {chain_id} is stuck at nonce {nonce_low} since height {since}")]
    StuckNonce {
        /// The chain.
        chain_id: ChainId,
        /// The lowest unconfirmed nonce.
        nonce_low: u64,
        /// Height of the last advance of the pending range.
        since: u64,
    },
    /// No cctx has been assigned to the nonce.
    #[error("No cctx assigned to nonce {nonce} on chain {chain_id}")]
    NotFound {
        /// The chain.
        chain_id: ChainId,
        /// The nonce.
        nonce: u64,
    },
    /// There is no current TSS key to allocate under.
    #[error("No active TSS key")]
    NoActiveTss,
    /// The pending range must be empty for this operation.
    #[error("Chain {0} still has pending nonces")]
    PendingNoncesExist(ChainId),
    /// A reset would move the chain nonce below nonces already handed out.
    #[error("Chain {chain_id} cannot move back from nonce {current} to {requested}")]
    NonceRegression {
        /// The chain.
        chain_id: ChainId,
        /// The chain's next nonce.
        current: u64,
        /// The nonce the reset asked for.
        requested: u64,
    },
}

impl ErrorCode for NonceError {
    fn code(&self) -> &'static str {
        match self {
            Self::ChainNotSupported(_) => "NONCE_CHAIN_NOT_SUPPORTED",
            Self::OutboundDisabled => "NONCE_OUTBOUND_DISABLED",
            Self::NonceNotPending { .. } => "NONCE_NOT_PENDING",
            Self::StuckNonce { .. } => "NONCE_STUCK",
            Self::NotFound { .. } => "NONCE_NOT_FOUND",
            Self::NoActiveTss => "NONCE_NO_ACTIVE_TSS",
            Self::PendingNoncesExist(_) => "NONCE_PENDING_EXIST",
            Self::NonceRegression { .. } => "NONCE_REGRESSION",
        }
    }
}

/// Errors raised by the TSS key-generation state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TssError {
    /// A ceremony is already pending.
    #[error("A keygen ceremony is already pending at block {0}")]
    KeygenAlreadyPending(u64),
    /// No ceremony is pending.
    #[error("No keygen ceremony is pending")]
    KeygenNotPending,
    /// No TSS key has been finalized yet.
    #[error("TSS not found")]
    TssNotFound,
    /// The voted key does not match the pending ceremony.
    #[error("Keygen height mismatch. Expected {expected}, got {got}")]
    KeygenHeightMismatch {
        /// Block number of the pending ceremony.
        expected: u64,
        /// Block number supplied by the vote.
        got: u64,
    },
    /// A fund migrator is already registered for the chain.
    #[error("Fund migrator already exists for chain {0}")]
    FundMigratorExists(ChainId),
}

impl ErrorCode for TssError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeygenAlreadyPending(_) => "TSS_KEYGEN_ALREADY_PENDING",
            Self::KeygenNotPending => "TSS_KEYGEN_NOT_PENDING",
            Self::TssNotFound => "TSS_NOT_FOUND",
            Self::KeygenHeightMismatch { .. } => "TSS_KEYGEN_HEIGHT_MISMATCH",
            Self::FundMigratorExists(_) => "TSS_FUND_MIGRATOR_EXISTS",
        }
    }
}

/// Errors related to governance-gated operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// The signer is not the governance authority.
    #[error("Signer {0} is not the governance authority")]
    Unauthorized(AccountId),
    /// No governance policy is stored.
    #[error("Governance policy not found in state")]
    PolicyNotFound,
    /// The submitted chain params failed validation.
    #[error("Invalid chain params: {0}")]
    InvalidChainParams(String),
    /// A method reserved for the chain itself was called by a user.
    #[error("Method '{0}' is internal")]
    InternalOnly(String),
}

impl ErrorCode for GovernanceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "GOVERNANCE_UNAUTHORIZED",
            Self::PolicyNotFound => "GOVERNANCE_POLICY_NOT_FOUND",
            Self::InvalidChainParams(_) => "GOVERNANCE_INVALID_CHAIN_PARAMS",
            Self::InternalOnly(_) => "GOVERNANCE_INTERNAL_ONLY",
        }
    }
}

/// Error returned when a threshold string or ratio is out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    /// The value is not a decimal number.
    #[error("Invalid threshold '{0}'")]
    Parse(String),
    /// The value is greater than one.
    #[error("Threshold {0} exceeds 1")]
    OutOfRange(String),
}

impl ErrorCode for ThresholdError {
    fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "THRESHOLD_PARSE_ERROR",
            Self::OutOfRange(_) => "THRESHOLD_OUT_OF_RANGE",
        }
    }
}

/// Errors returned from processing a single state transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Encoding a value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Decoding a value failed.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// A generic invalid input.
    #[error("Invalid transaction: {0}")]
    Invalid(String),
    /// The target service or method does not exist.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// State access failed.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// Ballot or observer misuse.
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),
    /// Nonce allocation failure.
    #[error("Nonce error: {0}")]
    Nonce(#[from] NonceError),
    /// Keygen state machine failure.
    #[error("TSS error: {0}")]
    Tss(#[from] TssError),
    /// Governance gating failure.
    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),
    /// A core invariant was violated. The transition must not be committed.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl TransactionError {
    /// Returns true if the error indicates corrupted core state rather than a rejected input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "TX_SERIALIZATION_ERROR",
            Self::Deserialization(_) => "TX_DESERIALIZATION_ERROR",
            Self::Invalid(_) => "TX_INVALID",
            Self::Unsupported(_) => "TX_UNSUPPORTED",
            Self::State(e) => e.code(),
            Self::Observer(e) => e.code(),
            Self::Nonce(e) => e.code(),
            Self::Tss(e) => e.code(),
            Self::Governance(e) => e.code(),
            Self::InvariantViolation(_) => "TX_INVARIANT_VIOLATION",
        }
    }
}

impl From<String> for TransactionError {
    fn from(s: String) -> Self {
        TransactionError::Invalid(s)
    }
}

impl From<parity_scale_codec::Error> for TransactionError {
    fn from(e: parity_scale_codec::Error) -> Self {
        TransactionError::State(StateError::Decode(e.to_string()))
    }
}

impl From<serde_json::Error> for TransactionError {
    fn from(e: serde_json::Error) -> Self {
        TransactionError::Serialization(e.to_string())
    }
}

/// Errors loading node configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML document is malformed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// The JSON document is malformed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// A value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "CONFIG_IO_ERROR",
            Self::Toml(_) => "CONFIG_TOML_ERROR",
            Self::Json(_) => "CONFIG_JSON_ERROR",
            Self::Invalid(_) => "CONFIG_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_error_forwards_inner_codes() {
        let err: TransactionError = NonceError::OutboundDisabled.into();
        assert_eq!(err.code(), "NONCE_OUTBOUND_DISABLED");
        let err: TransactionError = TssError::KeygenNotPending.into();
        assert_eq!(err.code(), "TSS_KEYGEN_NOT_PENDING");
        assert!(!err.is_fatal());
    }

    #[test]
    fn invariant_violation_is_fatal() {
        let err = TransactionError::InvariantViolation("duplicate blame index".into());
        assert!(err.is_fatal());
        assert_eq!(err.code(), "TX_INVARIANT_VIOLATION");
    }
}
