// Path: crates/types/src/app/chain_params.rs
//! Per-chain tunables read by voting and nonce allocation.

use super::{ChainId, Threshold};
use crate::error::GovernanceError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const TICKER_RANGE: RangeInclusive<u64> = 1..=300;
const SCHEDULE_INTERVAL_RANGE: RangeInclusive<i64> = 1..=100;
const SCHEDULE_LOOKAHEAD_RANGE: RangeInclusive<i64> = 1..=500;

/// Configuration of one external chain.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// The chain.
    pub chain_id: ChainId,
    /// Block confirmations before an observation is voted on.
    pub confirmation_count: u64,
    /// Seconds between gas price polls.
    pub gas_price_ticker: u64,
    /// Seconds between inbound scans.
    pub in_tx_ticker: u64,
    /// Seconds between outbound scans.
    pub out_tx_ticker: u64,
    /// Seconds between UTXO refreshes.
    pub watch_utxo_ticker: u64,
    /// Address of the token contract on the chain.
    pub token_contract_address: String,
    /// Address of the connector contract on the chain.
    pub connector_contract_address: String,
    /// Address of the custody contract on the chain.
    pub custody_contract_address: String,
    /// Blocks between outbound scheduling rounds.
    pub outbound_tx_schedule_interval: i64,
    /// Number of pending nonces scheduled ahead.
    pub outbound_tx_schedule_lookahead: i64,
    /// Default threshold for ballots about this chain.
    pub ballot_threshold: Threshold,
    /// Minimum delegation an observer needs to vote on this chain.
    pub min_observer_delegation: u64,
    /// Whether the chain accepts new work.
    pub is_supported: bool,
}

impl ChainParams {
    /// Checks that every tunable is inside its allowed range.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        let invalid = |msg: String| Err(GovernanceError::InvalidChainParams(msg));
        if self.confirmation_count == 0 {
            return invalid(format!("chain {}: confirmation_count must be > 0", self.chain_id));
        }
        for (name, v) in [
            ("gas_price_ticker", self.gas_price_ticker),
            ("in_tx_ticker", self.in_tx_ticker),
            ("out_tx_ticker", self.out_tx_ticker),
            ("watch_utxo_ticker", self.watch_utxo_ticker),
        ] {
            if !TICKER_RANGE.contains(&v) {
                return invalid(format!("chain {}: {name} {v} out of range 1..=300", self.chain_id));
            }
        }
        if !SCHEDULE_INTERVAL_RANGE.contains(&self.outbound_tx_schedule_interval) {
            return invalid(format!(
                "chain {}: outbound_tx_schedule_interval {} out of range 1..=100",
                self.chain_id, self.outbound_tx_schedule_interval
            ));
        }
        if !SCHEDULE_LOOKAHEAD_RANGE.contains(&self.outbound_tx_schedule_lookahead) {
            return invalid(format!(
                "chain {}: outbound_tx_schedule_lookahead {} out of range 1..=500",
                self.chain_id, self.outbound_tx_schedule_lookahead
            ));
        }
        Ok(())
    }
}

/// All configured chains, ordered by chain id.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainParamsList {
    /// The entries.
    pub chain_params: Vec<ChainParams>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChainParams {
        ChainParams {
            chain_id: ChainId(5),
            confirmation_count: 12,
            gas_price_ticker: 30,
            in_tx_ticker: 12,
            out_tx_ticker: 15,
            watch_utxo_ticker: 1,
            token_contract_address: "0x01".into(),
            connector_contract_address: "0x02".into(),
            custody_contract_address: "0x03".into(),
            outbound_tx_schedule_interval: 30,
            outbound_tx_schedule_lookahead: 60,
            ballot_threshold: "0.66".parse().unwrap(),
            min_observer_delegation: 1000,
            is_supported: true,
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn ticker_bounds_are_enforced() {
        let mut p = params();
        p.in_tx_ticker = 0;
        assert!(matches!(p.validate(), Err(GovernanceError::InvalidChainParams(m)) if m.contains("in_tx_ticker")));
        let mut p = params();
        p.gas_price_ticker = 301;
        assert!(p.validate().is_err());
    }

    #[test]
    fn schedule_bounds_are_enforced() {
        let mut p = params();
        p.outbound_tx_schedule_interval = 101;
        assert!(p.validate().is_err());
        let mut p = params();
        p.outbound_tx_schedule_lookahead = 0;
        assert!(p.validate().is_err());
        let mut p = params();
        p.confirmation_count = 0;
        assert!(p.validate().is_err());
    }
}
