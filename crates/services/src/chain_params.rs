// Path: crates/services/src/chain_params.rs
//! Governance-managed per-chain parameters.

use parity_scale_codec::{Decode, Encode};
use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_macros::service_interface;
use xco_types::app::{ChainId, ChainParams, ChainParamsList};
use xco_types::error::{GovernanceError, NonceError, TransactionError};
use xco_types::keys::{chain_params_key, CHAIN_PARAMS_PREFIX};

#[derive(Encode, Decode, Debug, Clone)]
pub struct UpdateChainParamsParams {
    pub params: ChainParams,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct RemoveChainParamsParams {
    pub chain_id: ChainId,
}

/// Stores one [`ChainParams`] per external chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainParamsRegistry;

impl ChainParamsRegistry {
    pub fn get_params(
        state: &dyn StateAccess,
        chain_id: ChainId,
    ) -> Result<Option<ChainParams>, TransactionError> {
        Ok(state.get_typed(&chain_params_key(chain_id))?)
    }

    /// Params of a chain that exists and is marked supported.
    pub fn supported_params(
        state: &dyn StateAccess,
        chain_id: ChainId,
    ) -> Result<ChainParams, TransactionError> {
        match Self::get_params(state, chain_id)? {
            Some(p) if p.is_supported => Ok(p),
            _ => Err(NonceError::ChainNotSupported(chain_id).into()),
        }
    }

    /// Every configured chain, ordered by chain id.
    pub fn all(state: &dyn StateAccess) -> Result<ChainParamsList, TransactionError> {
        let chain_params = state
            .scan_typed::<ChainParams>(CHAIN_PARAMS_PREFIX)?
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        Ok(ChainParamsList { chain_params })
    }

    /// Chains marked supported, ordered by chain id.
    pub fn supported_chains(state: &dyn StateAccess) -> Result<Vec<ChainParams>, TransactionError> {
        Ok(Self::all(state)?
            .chain_params
            .into_iter()
            .filter(|p| p.is_supported)
            .collect())
    }
}

#[service_interface(id = "chain_params", abi_version = 1, state_schema = "v1")]
impl ChainParamsRegistry {
    /// Inserts or replaces the params of one chain.
    #[method(governance)]
    pub fn update_chain_params(
        &self,
        state: &mut dyn StateAccess,
        params: UpdateChainParamsParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let p = params.params;
        p.validate()?;
        state.put_typed(&chain_params_key(p.chain_id), &p)?;
        tracing::info!(
            target: "observer",
            event = "chain_params_updated",
            chain_id = %p.chain_id,
            supported = p.is_supported,
            threshold = %p.ballot_threshold,
            height = ctx.block_height,
        );
        Ok(())
    }

    #[method(governance)]
    pub fn remove_chain_params(
        &self,
        state: &mut dyn StateAccess,
        params: RemoveChainParamsParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let key = chain_params_key(params.chain_id);
        if state.get(&key)?.is_none() {
            return Err(GovernanceError::InvalidChainParams(format!(
                "chain {} has no params",
                params.chain_id
            ))
            .into());
        }
        state.delete(&key)?;
        tracing::info!(
            target: "observer",
            event = "chain_params_removed",
            chain_id = %params.chain_id,
            height = ctx.block_height,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xco_api::state::MemoryState;
    use xco_test_utils::sample;

    #[test]
    fn supported_chains_filters_and_orders() {
        let mut state = MemoryState::new();
        for p in [
            sample::chain_params_supported(56),
            sample::chain_params(1),
            sample::chain_params_supported(-3),
        ] {
            state.put_typed(&chain_params_key(p.chain_id), &p).unwrap();
        }
        let ids: Vec<i64> = ChainParamsRegistry::supported_chains(&state)
            .unwrap()
            .iter()
            .map(|p| p.chain_id.0)
            .collect();
        assert_eq!(ids, vec![-3, 56]);
        assert_eq!(ChainParamsRegistry::all(&state).unwrap().chain_params.len(), 3);
        assert!(ChainParamsRegistry::supported_params(&state, ChainId(1)).is_err());
        assert!(ChainParamsRegistry::supported_params(&state, ChainId(2)).is_err());
    }
}
