// Path: crates/types/src/config/genesis.rs

//! The genesis document of the observer core.

use crate::app::{
    Ballot, Blame, ChainNonces, ChainParams, CrosschainFlags, Keygen, NodeAccount, NonceToCctx,
    PendingNonces, Tss, TssFundMigratorInfo,
};
use crate::error::ConfigError;
use crate::service_configs::GovernancePolicy;
use serde::{Deserialize, Serialize};

/// Complete initial (or exported) state of the observer core.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct GenesisState {
    /// Governance authority.
    #[serde(default)]
    pub governance: Option<GovernancePolicy>,
    /// Observers, in observer-set order.
    #[serde(default)]
    pub node_accounts: Vec<NodeAccount>,
    /// Crosschain flags. Both enabled when absent.
    #[serde(default)]
    pub crosschain_flags: Option<CrosschainFlags>,
    /// Per-chain params.
    #[serde(default)]
    pub chain_params: Vec<ChainParams>,
    /// Per-chain next nonce.
    #[serde(default)]
    pub chain_nonces: Vec<ChainNonces>,
    /// Per-chain pending range.
    #[serde(default)]
    pub pending_nonces: Vec<PendingNonces>,
    /// Nonce to cctx mappings.
    #[serde(default)]
    pub nonce_to_cctx: Vec<NonceToCctx>,
    /// Current TSS.
    #[serde(default)]
    pub tss: Option<Tss>,
    /// Prior TSS keys, ordered by finalized height.
    #[serde(default)]
    pub tss_history: Vec<Tss>,
    /// Keygen ceremony.
    #[serde(default)]
    pub keygen: Option<Keygen>,
    /// Fund migrators.
    #[serde(default)]
    pub tss_fund_migrators: Vec<TssFundMigratorInfo>,
    /// Ballots.
    #[serde(default)]
    pub ballots: Vec<Ballot>,
    /// Blame records.
    #[serde(default)]
    pub blame: Vec<Blame>,
}

impl GenesisState {
    /// Parses a JSON genesis document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
