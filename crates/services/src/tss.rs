// Path: crates/services/src/tss.rs
//! The TSS key-generation state machine.
//!
//! ```text
//! NoKey --start--> Pending --succeeded--> Success --start--> Pending ...
//!                          \--failed----> Failed  --start--> Pending ...
//! ```
//!
//! Each ceremony gets a fresh `attempt` number, so blame records of repeated
//! failures at the same block never collide.

use crate::blame::BlameRecorder;
use parity_scale_codec::{Decode, Encode};
use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_macros::service_interface;
use xco_types::app::{
    keygen_blame_index, AccountId, BlameNode, ChainId, Keygen, KeygenStatus, ObserverEvent, Tss,
    TssFundMigratorInfo,
};
use xco_types::error::{TransactionError, TssError};
use xco_types::keys::{
    tss_fund_migrator_key, tss_history_height_prefix, tss_history_key, KEYGEN_KEY,
    TSS_FUND_MIGRATOR_PREFIX, TSS_HISTORY_PREFIX, TSS_KEY,
};

#[derive(Encode, Decode, Debug, Clone)]
pub struct StartKeygenParams {
    pub grantee_pubkeys: Vec<String>,
    pub block_number: u64,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct AddTssFundMigratorParams {
    pub chain_id: ChainId,
    pub migration_cctx_index: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TssKeygen;

impl TssKeygen {
    pub fn current_tss(state: &dyn StateAccess) -> Result<Option<Tss>, TransactionError> {
        Ok(state.get_typed(TSS_KEY)?)
    }

    /// Appends `tss` to the history after any key retired at the same height.
    pub(crate) fn archive(state: &mut dyn StateAccess, tss: &Tss) -> Result<(), TransactionError> {
        let seq = state
            .scan_typed::<Tss>(&tss_history_height_prefix(tss.finalized_height))?
            .len() as u64;
        state.put_typed(&tss_history_key(tss.finalized_height, seq), tss)?;
        Ok(())
    }

    /// Retired keys, ordered by the height at which they were finalized and
    /// then by retirement order.
    pub fn tss_history(state: &dyn StateAccess) -> Result<Vec<Tss>, TransactionError> {
        Ok(state
            .scan_typed::<Tss>(TSS_HISTORY_PREFIX)?
            .into_iter()
            .map(|(_, t)| t)
            .collect())
    }

    pub fn keygen(state: &dyn StateAccess) -> Result<Option<Keygen>, TransactionError> {
        Ok(state.get_typed(KEYGEN_KEY)?)
    }

    pub fn fund_migrator(
        state: &dyn StateAccess,
        chain_id: ChainId,
    ) -> Result<Option<TssFundMigratorInfo>, TransactionError> {
        Ok(state.get_typed(&tss_fund_migrator_key(chain_id))?)
    }

    pub fn fund_migrators(state: &dyn StateAccess) -> Result<Vec<TssFundMigratorInfo>, TransactionError> {
        Ok(state
            .scan_typed::<TssFundMigratorInfo>(TSS_FUND_MIGRATOR_PREFIX)?
            .into_iter()
            .map(|(_, m)| m)
            .collect())
    }

    /// The keygen ceremony that is currently pending.
    pub fn pending_keygen(state: &dyn StateAccess) -> Result<Keygen, TransactionError> {
        match Self::keygen(state)? {
            Some(k) if k.status == KeygenStatus::Pending => Ok(k),
            _ => Err(TssError::KeygenNotPending.into()),
        }
    }

    /// Completes the pending ceremony with `tss_pubkey` as the new current key.
    ///
    /// The previous key, if any, moves to the history table.
    pub fn keygen_succeeded(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        tss_pubkey: String,
        operators: &[AccountId],
    ) -> Result<Tss, TransactionError> {
        let mut keygen = Self::pending_keygen(state)?;
        if let Some(previous) = Self::current_tss(state)? {
            Self::archive(state, &previous)?;
        }

        let tss = Tss {
            tss_pubkey: tss_pubkey.clone(),
            tss_participant_list: keygen.grantee_pubkeys.clone(),
            operator_address_list: operators.iter().map(|a| a.to_string()).collect(),
            keygen_height: keygen.block_number,
            finalized_height: ctx.block_height,
        };
        state.put_typed(TSS_KEY, &tss)?;
        keygen.status = KeygenStatus::Success;
        state.put_typed(KEYGEN_KEY, &keygen)?;

        xco_telemetry::observer_metrics().inc_keygen_outcome("success");
        tracing::info!(
            target: "tss",
            event = "keygen_succeeded",
            tss_pubkey = %tss_pubkey,
            attempt = keygen.attempt,
            keygen_height = keygen.block_number,
            height = ctx.block_height,
        );
        ctx.emit(ObserverEvent::KeygenCompleted {
            status: KeygenStatus::Success,
            tss_pubkey: Some(tss_pubkey),
        });
        Ok(tss)
    }

    /// Fails the pending ceremony and records exactly one blame for it.
    pub fn keygen_failed(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        reason: String,
        nodes: Vec<BlameNode>,
    ) -> Result<(), TransactionError> {
        let mut keygen = Self::pending_keygen(state)?;
        keygen.status = KeygenStatus::Failed;
        state.put_typed(KEYGEN_KEY, &keygen)?;

        let index = keygen_blame_index(keygen.attempt, keygen.block_number);
        BlameRecorder.record(state, ctx, index, reason, nodes)?;

        xco_telemetry::observer_metrics().inc_keygen_outcome("failure");
        tracing::warn!(
            target: "tss",
            event = "keygen_failed",
            attempt = keygen.attempt,
            keygen_height = keygen.block_number,
            height = ctx.block_height,
        );
        ctx.emit(ObserverEvent::KeygenCompleted {
            status: KeygenStatus::Failed,
            tss_pubkey: None,
        });
        Ok(())
    }
}

#[service_interface(id = "tss", abi_version = 1, state_schema = "v1")]
impl TssKeygen {
    #[method(governance)]
    pub fn start_keygen(
        &self,
        state: &mut dyn StateAccess,
        params: StartKeygenParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let previous = Self::keygen(state)?;
        if let Some(k) = &previous {
            if k.status == KeygenStatus::Pending {
                return Err(TssError::KeygenAlreadyPending(k.block_number).into());
            }
        }
        let attempt = previous.map(|k| k.attempt).unwrap_or(0).saturating_add(1);
        let keygen = Keygen {
            status: KeygenStatus::Pending,
            grantee_pubkeys: params.grantee_pubkeys,
            block_number: params.block_number,
            attempt,
        };
        state.put_typed(KEYGEN_KEY, &keygen)?;
        tracing::info!(
            target: "tss",
            event = "keygen_started",
            attempt,
            keygen_height = keygen.block_number,
            grantees = keygen.grantee_pubkeys.len(),
        );
        ctx.emit(ObserverEvent::KeygenStarted {
            block_number: keygen.block_number,
            attempt,
        });
        Ok(())
    }

    /// Registers the migration cctx of a chain during a key rotation. Write-once per chain.
    #[method(governance)]
    pub fn add_tss_fund_migrator(
        &self,
        state: &mut dyn StateAccess,
        params: AddTssFundMigratorParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let key = tss_fund_migrator_key(params.chain_id);
        if state.get(&key)?.is_some() {
            return Err(TssError::FundMigratorExists(params.chain_id).into());
        }
        let info = TssFundMigratorInfo {
            chain_id: params.chain_id,
            migration_cctx_index: params.migration_cctx_index,
        };
        state.put_typed(&key, &info)?;
        tracing::info!(
            target: "tss",
            event = "fund_migrator_added",
            chain_id = %info.chain_id,
            cctx_index = %info.migration_cctx_index,
            height = ctx.block_height,
        );
        Ok(())
    }
}
