//! Seeded builders for observer entities.
//!
//! Every builder derives its randomness from its arguments, so the same call
//! returns the same value in every test run.

use crate::randomness::TestRng;
use xco_types::app::{
    AccountId, Ballot, BallotStatus, Blame, BlameNode, ChainId, ChainNonces, ChainParams,
    ChainParamsList, CrosschainFlags, FailurePolicy, Keygen, KeygenStatus, LastObserverCount,
    NodeAccount, NodeStatus, NonceToCctx, ObservationType, ObserverSet, PendingNonces, PubKeySet,
    Threshold, Tss, TssFundMigratorInfo, VoteType,
};

/// Deterministic account derived from a small integer.
pub fn account(n: u8) -> AccountId {
    let mut bytes = [0u8; 32];
    if let Some(first) = bytes.first_mut() {
        *first = 0xac;
    }
    if let Some(last) = bytes.last_mut() {
        *last = n;
    }
    AccountId(bytes)
}

/// A random account seeded by `seed`.
pub fn account_from(seed: &str) -> AccountId {
    TestRng::from_str_seed(seed).account_id()
}

/// An in-progress ballot with two voters, one of which voted `Failure` and one `Success`.
pub fn ballot(index: &str) -> Ballot {
    let mut r = TestRng::from_str_seed(index);
    Ballot {
        index: index.to_string(),
        identifier: r.string(16),
        voter_list: vec![r.account_id(), r.account_id()],
        votes: vec![VoteType::Failure, VoteType::Success],
        weights: vec![],
        observation_type: ObservationType::Inbound,
        threshold: Threshold::ONE,
        failure_policy: FailurePolicy::SuccessUnreachable,
        status: BallotStatus::InProgress,
        creation_height: 42,
        finalized_height: None,
        observer_set_version: 1,
    }
}

/// `n` observers, ordered by account bytes.
pub fn observers(n: u8) -> Vec<AccountId> {
    (1..=n).map(account).collect()
}

/// An observer set of `n` observers built from [`observers`].
pub fn observer_set(n: u8) -> ObserverSet {
    ObserverSet {
        version: 1,
        observers: observers(n),
        last_change_height: 1,
    }
}

/// An active node account for `operator`.
pub fn node_account(operator: AccountId) -> NodeAccount {
    let mut r = TestRng::from_str_seed(&operator.to_string());
    NodeAccount {
        operator,
        grantee_address: r.account_id(),
        grantee_pubkey: PubKeySet {
            secp256k1: r.pubkey_hex(),
            ed25519: r.pubkey_hex(),
        },
        node_status: NodeStatus::Active,
        delegation: 1,
    }
}

/// Flags with both directions enabled.
pub fn crosschain_flags() -> CrosschainFlags {
    CrosschainFlags {
        is_inbound_enabled: true,
        is_outbound_enabled: true,
    }
}

/// A successful keygen with one grantee.
pub fn keygen(seed: &str) -> Keygen {
    let mut r = TestRng::from_str_seed(seed);
    Keygen {
        status: KeygenStatus::Success,
        grantee_pubkeys: vec![r.pubkey_hex()],
        block_number: r.u64_in_range(1, 1_000_000),
        attempt: 1,
    }
}

/// Last observer count with a count of 10 at `last_change_height`.
pub fn last_observer_count(last_change_height: u64) -> LastObserverCount {
    LastObserverCount {
        count: 10,
        last_change_height,
    }
}

/// Valid, unsupported chain params with tunables drawn inside their ranges.
pub fn chain_params(chain_id: i64) -> ChainParams {
    let mut r = TestRng::from_str_seed(&format!("chain-params-{chain_id}"));
    ChainParams {
        chain_id: ChainId(chain_id),
        confirmation_count: r.u64_in_range(1, 1001),
        gas_price_ticker: r.u64_in_range(1, 301),
        in_tx_ticker: r.u64_in_range(1, 301),
        out_tx_ticker: r.u64_in_range(1, 301),
        watch_utxo_ticker: r.u64_in_range(1, 301),
        token_contract_address: r.eth_address(),
        connector_contract_address: r.eth_address(),
        custody_contract_address: r.eth_address(),
        outbound_tx_schedule_interval: r.i64_in_range(1, 101),
        outbound_tx_schedule_lookahead: r.i64_in_range(1, 501),
        ballot_threshold: Threshold::from_parts(500_000_000).unwrap_or(Threshold::ONE),
        min_observer_delegation: 1,
        is_supported: false,
    }
}

/// Like [`chain_params`] but marked supported.
pub fn chain_params_supported(chain_id: i64) -> ChainParams {
    ChainParams {
        is_supported: true,
        ..chain_params(chain_id)
    }
}

/// Params for every chain in `chain_ids`, in the given order.
pub fn chain_params_list(chain_ids: &[i64]) -> ChainParamsList {
    ChainParamsList {
        chain_params: chain_ids.iter().map(|c| chain_params(*c)).collect(),
    }
}

/// A TSS key finalized at height 1000.
pub fn tss(seed: &str) -> Tss {
    let mut r = TestRng::from_str_seed(seed);
    Tss {
        tss_pubkey: r.pubkey_hex(),
        tss_participant_list: vec![],
        operator_address_list: vec![],
        keygen_height: 1000,
        finalized_height: 1000,
    }
}

/// `n` TSS keys with distinct, increasing heights.
pub fn tss_list(n: u64) -> Vec<Tss> {
    (0..n)
        .map(|i| {
            let mut t = tss(&format!("tss-{i}"));
            t.keygen_height += i;
            t.finalized_height += i;
            t
        })
        .collect()
}

/// Fund migrator info for `chain_id`.
pub fn tss_fund_migrator(chain_id: i64) -> TssFundMigratorInfo {
    TssFundMigratorInfo {
        chain_id: ChainId(chain_id),
        migration_cctx_index: "sampleIndex".to_string(),
    }
}

/// A blame record whose index is `index` suffixed with a random token.
pub fn blame_record(index: &str) -> Blame {
    let mut r = TestRng::from_str_seed(index);
    Blame {
        index: format!("{}-{}", index, r.string(8)),
        failure_reason: "sample failure reason".to_string(),
        nodes: vec![BlameNode::named(r.pubkey_hex())],
    }
}

/// `n` blame records with distinct indices.
pub fn blame_records_list(n: usize) -> Vec<Blame> {
    (0..n).map(|i| blame_record(&i.to_string())).collect()
}

/// Chain nonces for `chain_id`.
pub fn chain_nonces(chain_id: i64) -> ChainNonces {
    let mut r = TestRng::from_str_seed(&format!("chain-nonces-{chain_id}"));
    ChainNonces {
        chain_id: ChainId(chain_id),
        nonce: r.u64_in_range(0, 10_000),
        signers: vec![r.account_id(), r.account_id()],
        finalized_height: r.u64_in_range(0, 10_000),
    }
}

/// Chain nonces for chains `1..=n`.
pub fn chain_nonces_list(n: i64) -> Vec<ChainNonces> {
    (1..=n).map(chain_nonces).collect()
}

/// `count` pending ranges under `tss`, one per chain starting at chain 1.
pub fn pending_nonces_list(tss: &str, count: i64) -> Vec<PendingNonces> {
    (1..=count)
        .map(|c| {
            let mut r = TestRng::from_str_seed(&format!("pending-{tss}-{c}"));
            let low = r.u64_in_range(0, 1000);
            PendingNonces {
                chain_id: ChainId(c),
                nonce_low: low,
                nonce_high: low + r.u64_in_range(1, 100),
                tss: tss.to_string(),
                held: vec![],
                last_advance_height: 0,
            }
        })
        .collect()
}

/// `count` consecutive nonce mappings on `chain_id` starting at nonce 0.
pub fn nonce_to_cctx_list(chain_id: i64, tss: &str, count: u64) -> Vec<NonceToCctx> {
    (0..count)
        .map(|nonce| NonceToCctx {
            chain_id: ChainId(chain_id),
            nonce,
            cctx_index: format!("cctx-{chain_id}-{nonce}"),
            tss: tss.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_are_deterministic() {
        assert_eq!(ballot("a"), ballot("a"));
        assert_ne!(ballot("a").voter_list, ballot("b").voter_list);
        assert_eq!(chain_params(5), chain_params(5));
        assert_eq!(blame_record("x").index, blame_record("x").index);
    }

    #[test]
    fn chain_params_are_valid() {
        for c in [1, 5, 56, 7000, 8332] {
            assert!(chain_params(c).validate().is_ok());
            assert!(chain_params_supported(c).is_supported);
        }
    }

    #[test]
    fn tss_list_heights_increase() {
        let list = tss_list(3);
        assert!(list.windows(2).all(|w| w[0].finalized_height < w[1].finalized_height));
    }

    #[test]
    fn pending_ranges_are_non_empty() {
        for p in pending_nonces_list("tss", 5) {
            assert!(!p.is_empty());
        }
    }
}
