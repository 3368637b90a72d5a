// Path: crates/services/src/genesis.rs
//! Genesis import and export for every table of the observer core.

use crate::blame::BlameRecorder;
use crate::chain_params::ChainParamsRegistry;
use crate::nonce::NonceAllocator;
use crate::observer::ObserverRegistry;
use crate::tss::TssKeygen;
use std::collections::{BTreeMap, BTreeSet};
use xco_api::state::{StateAccess, StateAccessExt};
use xco_types::app::{Ballot, NonceToCctx, ObserverSet};
use xco_types::config::GenesisState;
use xco_types::error::{ObserverError, TransactionError};
use xco_types::keys::{
    ballot_height_key, ballot_key, blame_key, chain_nonces_key, chain_params_key, node_account_key,
    nonce_to_cctx_key, pending_nonces_key, tss_fund_migrator_key,
    BALLOT_PREFIX, CROSSCHAIN_FLAGS_KEY, GOVERNANCE_KEY, KEYGEN_KEY, NONCE_TO_CCTX_PREFIX, TSS_KEY,
};

/// Checks that the nonce, ballot and blame tables agree with each other.
fn validate_tables(genesis: &GenesisState) -> Result<(), TransactionError> {
    let mut next_nonce = BTreeMap::new();
    for n in &genesis.chain_nonces {
        if next_nonce.insert(n.chain_id, n.nonce).is_some() {
            return Err(TransactionError::Invalid(format!(
                "chain {}: chain nonces listed twice",
                n.chain_id
            )));
        }
    }
    for p in &genesis.pending_nonces {
        if p.nonce_low > p.nonce_high {
            return Err(TransactionError::Invalid(format!(
                "chain {}: pending range {}..{} is inverted",
                p.chain_id, p.nonce_low, p.nonce_high
            )));
        }
        match next_nonce.get(&p.chain_id) {
            Some(&nonce) if nonce == p.nonce_high => {}
            Some(&nonce) => {
                return Err(TransactionError::Invalid(format!(
                    "chain {}: pending high {} differs from next nonce {}",
                    p.chain_id, p.nonce_high, nonce
                )));
            }
            None => {
                return Err(TransactionError::Invalid(format!(
                    "chain {}: pending range without chain nonces",
                    p.chain_id
                )));
            }
        }
    }

    for ballot in &genesis.ballots {
        let voters = ballot.voter_list.len();
        if ballot.votes.len() != voters || (!ballot.weights.is_empty() && ballot.weights.len() != voters) {
            return Err(TransactionError::Invalid(format!(
                "ballot {}: {} voters but {} votes and {} weights",
                ballot.index,
                voters,
                ballot.votes.len(),
                ballot.weights.len()
            )));
        }
    }

    let mut blame_indices = BTreeSet::new();
    for blame in &genesis.blame {
        if !blame_indices.insert(blame.index.as_str()) {
            return Err(TransactionError::Invalid(format!(
                "blame {} listed twice",
                blame.index
            )));
        }
    }
    Ok(())
}

/// Writes `genesis` into an empty state.
pub fn init_genesis(state: &mut dyn StateAccess, genesis: &GenesisState) -> Result<(), TransactionError> {
    validate_tables(genesis)?;
    if let Some(policy) = &genesis.governance {
        state.put_typed(GOVERNANCE_KEY, policy)?;
    }

    if !genesis.node_accounts.is_empty() {
        let mut seen = BTreeSet::new();
        let mut set = ObserverSet::default();
        for node in &genesis.node_accounts {
            if !seen.insert(node.operator) {
                return Err(ObserverError::ObserverAlreadyExists(node.operator).into());
            }
            set.observers.push(node.operator);
            state.put_typed(&node_account_key(&node.operator), node)?;
        }
        ObserverRegistry::write_observer_set(state, set, 0)?;
    }
    if let Some(flags) = &genesis.crosschain_flags {
        state.put_typed(CROSSCHAIN_FLAGS_KEY, flags)?;
    }

    for params in &genesis.chain_params {
        params.validate()?;
        state.put_typed(&chain_params_key(params.chain_id), params)?;
    }
    for n in &genesis.chain_nonces {
        state.put_typed(&chain_nonces_key(n.chain_id), n)?;
    }
    for p in &genesis.pending_nonces {
        state.put_typed(&pending_nonces_key(p.chain_id), p)?;
    }
    for m in &genesis.nonce_to_cctx {
        state.put_typed(&nonce_to_cctx_key(m.chain_id, m.nonce), m)?;
    }

    if let Some(tss) = &genesis.tss {
        state.put_typed(TSS_KEY, tss)?;
    }
    for tss in &genesis.tss_history {
        TssKeygen::archive(state, tss)?;
    }
    if let Some(keygen) = &genesis.keygen {
        state.put_typed(KEYGEN_KEY, keygen)?;
    }
    for m in &genesis.tss_fund_migrators {
        state.put_typed(&tss_fund_migrator_key(m.chain_id), m)?;
    }

    for ballot in &genesis.ballots {
        state.put_typed(&ballot_key(&ballot.index), ballot)?;
        state.put_typed(&ballot_height_key(ballot.creation_height, &ballot.index), &ballot.index)?;
    }
    for blame in &genesis.blame {
        state.put_typed(&blame_key(&blame.index), blame)?;
    }

    log::info!(
        "Imported observer genesis: {} observers, {} chains, {} ballots, {} blame records",
        genesis.node_accounts.len(),
        genesis.chain_params.len(),
        genesis.ballots.len(),
        genesis.blame.len()
    );
    Ok(())
}

/// Reads every table back into a genesis document.
pub fn export_genesis(state: &dyn StateAccess) -> Result<GenesisState, TransactionError> {
    let set = ObserverRegistry::observer_set(state)?;
    let mut node_accounts = Vec::with_capacity(set.len());
    for operator in &set.observers {
        let node = ObserverRegistry::node_account(state, operator)?.ok_or_else(|| {
            TransactionError::InvariantViolation(format!("observer {operator} has no node account"))
        })?;
        node_accounts.push(node);
    }

    Ok(GenesisState {
        governance: state.get_typed(GOVERNANCE_KEY)?,
        node_accounts,
        crosschain_flags: state.get_typed(CROSSCHAIN_FLAGS_KEY)?,
        chain_params: ChainParamsRegistry::all(state)?.chain_params,
        chain_nonces: NonceAllocator::all_chain_nonces(state)?,
        pending_nonces: NonceAllocator::all_pending_nonces(state)?,
        nonce_to_cctx: state
            .scan_typed::<NonceToCctx>(NONCE_TO_CCTX_PREFIX)?
            .into_iter()
            .map(|(_, m)| m)
            .collect(),
        tss: TssKeygen::current_tss(state)?,
        tss_history: TssKeygen::tss_history(state)?,
        keygen: TssKeygen::keygen(state)?,
        tss_fund_migrators: TssKeygen::fund_migrators(state)?,
        ballots: state
            .scan_typed::<Ballot>(BALLOT_PREFIX)?
            .into_iter()
            .map(|(_, b)| b)
            .collect(),
        blame: BlameRecorder::list(state)?,
    })
}
