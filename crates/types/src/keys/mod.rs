// Path: crates/types/src/keys/mod.rs
//! Well-known state keys and key builders.
//!
//! Every table of the observer core lives under its own prefix. Numeric key
//! components are big-endian so that prefix scans return entries in numeric
//! order, which keeps iteration identical on every replica.

use crate::app::{AccountId, ChainId};

/// The state key for the governance policy.
pub const GOVERNANCE_KEY: &[u8] = b"system::governance_policy";

/// The state key for the current observer set.
pub const OBSERVER_SET_KEY: &[u8] = b"observer::set";
/// The state key for the last observer count.
pub const LAST_OBSERVER_COUNT_KEY: &[u8] = b"observer::last_count";
/// The state key prefix for node accounts, keyed by operator.
pub const NODE_ACCOUNT_PREFIX: &[u8] = b"observer::node::";
/// The state key for the crosschain flags.
pub const CROSSCHAIN_FLAGS_KEY: &[u8] = b"observer::flags";

/// The state key prefix for chain params, keyed by chain.
pub const CHAIN_PARAMS_PREFIX: &[u8] = b"observer::chain_params::";

/// The state key prefix for ballots, keyed by index.
pub const BALLOT_PREFIX: &[u8] = b"observer::ballot::";
/// The state key prefix for the ballot-by-creation-height index.
pub const BALLOT_HEIGHT_PREFIX: &[u8] = b"observer::ballot_height::";

/// The state key prefix for chain nonces, keyed by chain.
pub const CHAIN_NONCES_PREFIX: &[u8] = b"observer::chain_nonces::";
/// The state key prefix for pending nonces, keyed by chain.
pub const PENDING_NONCES_PREFIX: &[u8] = b"observer::pending_nonces::";
/// The state key prefix for nonce-to-cctx mappings, keyed by chain and nonce.
pub const NONCE_TO_CCTX_PREFIX: &[u8] = b"observer::nonce_to_cctx::";

/// The state key for the current TSS.
pub const TSS_KEY: &[u8] = b"observer::tss::current";
/// The state key prefix for historical TSS keys, keyed by finalized height.
pub const TSS_HISTORY_PREFIX: &[u8] = b"observer::tss::history::";
/// The state key for the keygen ceremony.
pub const KEYGEN_KEY: &[u8] = b"observer::keygen";
/// The state key prefix for fund migrator info, keyed by chain.
pub const TSS_FUND_MIGRATOR_PREFIX: &[u8] = b"observer::tss::migrator::";

/// The state key prefix for blame records, keyed by index.
pub const BLAME_PREFIX: &[u8] = b"observer::blame::";

/// Key of a node account.
pub fn node_account_key(operator: &AccountId) -> Vec<u8> {
    [NODE_ACCOUNT_PREFIX, operator.as_ref()].concat()
}

/// Key of a chain's params.
pub fn chain_params_key(chain_id: ChainId) -> Vec<u8> {
    [CHAIN_PARAMS_PREFIX, &chain_id.to_key_bytes()].concat()
}

/// Key of a ballot.
pub fn ballot_key(index: &str) -> Vec<u8> {
    [BALLOT_PREFIX, index.as_bytes()].concat()
}

/// Prefix of all ballot-height index entries at `height`.
pub fn ballot_height_prefix(height: u64) -> Vec<u8> {
    [BALLOT_HEIGHT_PREFIX, &height.to_be_bytes(), b"::"].concat()
}

/// Key of a ballot-height index entry.
pub fn ballot_height_key(height: u64, index: &str) -> Vec<u8> {
    [ballot_height_prefix(height).as_slice(), index.as_bytes()].concat()
}

/// Key of a chain's nonces.
pub fn chain_nonces_key(chain_id: ChainId) -> Vec<u8> {
    [CHAIN_NONCES_PREFIX, &chain_id.to_key_bytes()].concat()
}

/// Key of a chain's pending range.
pub fn pending_nonces_key(chain_id: ChainId) -> Vec<u8> {
    [PENDING_NONCES_PREFIX, &chain_id.to_key_bytes()].concat()
}

/// Key of a nonce-to-cctx mapping.
pub fn nonce_to_cctx_key(chain_id: ChainId, nonce: u64) -> Vec<u8> {
    [NONCE_TO_CCTX_PREFIX, &chain_id.to_key_bytes(), &nonce.to_be_bytes()].concat()
}

/// Prefix of every historical TSS finalized at `finalized_height`.
pub fn tss_history_height_prefix(finalized_height: u64) -> Vec<u8> {
    [TSS_HISTORY_PREFIX, &finalized_height.to_be_bytes()].concat()
}

/// Key of the `seq`-th historical TSS finalized at `finalized_height`.
pub fn tss_history_key(finalized_height: u64, seq: u64) -> Vec<u8> {
    [tss_history_height_prefix(finalized_height).as_slice(), &seq.to_be_bytes()].concat()
}

/// Key of a chain's fund migrator info.
pub fn tss_fund_migrator_key(chain_id: ChainId) -> Vec<u8> {
    [TSS_FUND_MIGRATOR_PREFIX, &chain_id.to_key_bytes()].concat()
}

/// Key of a blame record.
pub fn blame_key(index: &str) -> Vec<u8> {
    [BLAME_PREFIX, index.as_bytes()].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_keys_sort_by_chain_then_nonce() {
        let a = nonce_to_cctx_key(ChainId(5), 255);
        let b = nonce_to_cctx_key(ChainId(5), 256);
        let c = nonce_to_cctx_key(ChainId(6), 0);
        assert!(a < b && b < c);
    }

    #[test]
    fn ballot_height_keys_share_height_prefix() {
        let key = ballot_height_key(7, "abc");
        assert!(key.starts_with(&ballot_height_prefix(7)));
        assert!(!key.starts_with(&ballot_height_prefix(70)));
    }

    #[test]
    fn tss_history_keys_sort_by_height_then_seq() {
        let a = tss_history_key(1_100, 1);
        let b = tss_history_key(1_100, 2);
        let c = tss_history_key(1_101, 0);
        assert!(a < b && b < c);
        assert!(b.starts_with(&tss_history_height_prefix(1_100)));
        assert!(!c.starts_with(&tss_history_height_prefix(1_100)));
    }
}
