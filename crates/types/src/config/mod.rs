// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the observer core.
use crate::app::{ChainId, FailurePolicy, Threshold};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod genesis;
pub use genesis::*;

/// Ballot behavior shared by every service that opens ballots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BallotParams {
    /// Weight votes by each observer's delegation instead of one vote per observer.
    #[serde(default)]
    pub weighted_voting: bool,
    /// How ballots decide failure.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Threshold used when a chain has no params of its own.
    #[serde(default = "default_ballot_threshold")]
    pub default_threshold: Threshold,
}

fn default_ballot_threshold() -> Threshold {
    Threshold::from_ratio(2, 3).unwrap_or(Threshold::ONE)
}

impl Default for BallotParams {
    fn default() -> Self {
        Self {
            weighted_voting: false,
            failure_policy: FailurePolicy::default(),
            default_threshold: default_ballot_threshold(),
        }
    }
}

/// Nonce allocator tunables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NonceParams {
    /// Blocks a non-empty pending range may go without advancing before it is stuck.
    #[serde(default = "default_stuck_nonce_window")]
    pub stuck_nonce_window_blocks: u64,
}

fn default_stuck_nonce_window() -> u64 {
    100
}

impl Default for NonceParams {
    fn default() -> Self {
        Self {
            stuck_nonce_window_blocks: default_stuck_nonce_window(),
        }
    }
}

/// Keygen tunables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TssParams {
    /// Threshold of keygen ballots. Unanimity by default.
    #[serde(default = "default_keygen_threshold")]
    pub keygen_ballot_threshold: Threshold,
}

fn default_keygen_threshold() -> Threshold {
    Threshold::ONE
}

impl Default for TssParams {
    fn default() -> Self {
        Self {
            keygen_ballot_threshold: default_keygen_threshold(),
        }
    }
}

/// Top-level configuration of the observer core.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct CoreConfig {
    /// Id of the chain this core runs on. Inbound ballots targeting it need no outbound nonce.
    #[serde(default)]
    pub local_chain_id: ChainId,
    /// Ballot behavior.
    #[serde(default)]
    pub ballot: BallotParams,
    /// Nonce behavior.
    #[serde(default)]
    pub nonce: NonceParams,
    /// Keygen behavior.
    #[serde(default)]
    pub tss: TssParams,
}

impl CoreConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Rejects values that would make the core unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nonce.stuck_nonce_window_blocks == 0 {
            return Err(ConfigError::Invalid(
                "nonce.stuck_nonce_window_blocks must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, CoreConfig::default());
        assert_eq!(cfg.nonce.stuck_nonce_window_blocks, 100);
        assert_eq!(cfg.tss.keygen_ballot_threshold, Threshold::ONE);
        assert_eq!(cfg.ballot.failure_policy, FailurePolicy::SuccessUnreachable);
    }

    #[test]
    fn parses_sections() {
        let cfg = CoreConfig::from_toml_str(
            r#"
            local_chain_id = 7000

            [ballot]
            weighted_voting = true
            failure_policy = "failure_threshold"
            default_threshold = "0.5"

            [nonce]
            stuck_nonce_window_blocks = 20
            "#,
        )
        .unwrap();
        assert_eq!(cfg.local_chain_id, ChainId(7000));
        assert!(cfg.ballot.weighted_voting);
        assert_eq!(cfg.ballot.failure_policy, FailurePolicy::FailureThreshold);
        assert_eq!(cfg.ballot.default_threshold.to_string(), "0.5");
        assert_eq!(cfg.nonce.stuck_nonce_window_blocks, 20);
    }

    #[test]
    fn rejects_zero_stuck_window() {
        let err = CoreConfig::from_toml_str("[nonce]\nstuck_nonce_window_blocks = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
