// Path: crates/services/src/nonce.rs
//! Sequential outbound nonces per destination chain.
//!
//! For every chain the allocator keeps the next nonce to hand out
//! (`ChainNonces.nonce`) and the half-open range of handed-out but
//! unconfirmed nonces (`PendingNonces`). After every allocation
//! `PendingNonces.nonce_high == ChainNonces.nonce`; confirmations only ever
//! move `nonce_low` forward.

use crate::blame::BlameRecorder;
use crate::chain_params::ChainParamsRegistry;
use crate::observer::ObserverRegistry;
use crate::tss::TssKeygen;
use async_trait::async_trait;
use parity_scale_codec::{Decode, Encode};
use xco_api::lifecycle::OnEndBlock;
use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_macros::service_interface;
use xco_types::app::{
    keysign_blame_index, BlameNode, ChainId, ChainNonces, NonceToCctx, ObserverEvent,
    PendingNonces,
};
use xco_types::config::NonceParams;
use xco_types::error::{NonceError, TransactionError};
use xco_types::keys::{
    chain_nonces_key, nonce_to_cctx_key, pending_nonces_key, CHAIN_NONCES_PREFIX,
    PENDING_NONCES_PREFIX,
};

#[derive(Encode, Decode, Debug, Clone)]
pub struct ResetChainNoncesParams {
    pub chain_id: ChainId,
    pub nonce: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NonceAllocator {
    params: NonceParams,
}

impl NonceAllocator {
    pub fn new(params: NonceParams) -> Self {
        Self { params }
    }

    pub fn chain_nonces(
        state: &dyn StateAccess,
        chain_id: ChainId,
    ) -> Result<Option<ChainNonces>, TransactionError> {
        Ok(state.get_typed(&chain_nonces_key(chain_id))?)
    }

    pub fn all_chain_nonces(state: &dyn StateAccess) -> Result<Vec<ChainNonces>, TransactionError> {
        Ok(state
            .scan_typed::<ChainNonces>(CHAIN_NONCES_PREFIX)?
            .into_iter()
            .map(|(_, n)| n)
            .collect())
    }

    pub fn pending_nonces(
        state: &dyn StateAccess,
        chain_id: ChainId,
    ) -> Result<Option<PendingNonces>, TransactionError> {
        Ok(state.get_typed(&pending_nonces_key(chain_id))?)
    }

    /// Pending ranges of every chain, ordered by chain id.
    pub fn all_pending_nonces(state: &dyn StateAccess) -> Result<Vec<PendingNonces>, TransactionError> {
        Ok(state
            .scan_typed::<PendingNonces>(PENDING_NONCES_PREFIX)?
            .into_iter()
            .map(|(_, p)| p)
            .collect())
    }

    pub fn nonce_to_cctx(
        state: &dyn StateAccess,
        chain_id: ChainId,
        nonce: u64,
    ) -> Result<Option<NonceToCctx>, TransactionError> {
        Ok(state.get_typed(&nonce_to_cctx_key(chain_id, nonce))?)
    }

    /// The cctx index assigned to `nonce` on `chain_id`.
    pub fn lookup_cctx(
        state: &dyn StateAccess,
        chain_id: ChainId,
        nonce: u64,
    ) -> Result<String, TransactionError> {
        Self::nonce_to_cctx(state, chain_id, nonce)?
            .map(|m| m.cctx_index)
            .ok_or_else(|| NonceError::NotFound { chain_id, nonce }.into())
    }

    /// True if the range is non-empty and has not advanced within the window.
    pub fn is_stuck(&self, pending: &PendingNonces, height: u64) -> bool {
        !pending.is_empty()
            && height.saturating_sub(pending.last_advance_height) > self.params.stuck_nonce_window_blocks
    }

    /// Hands out the next nonce of `chain_id` to `cctx_index`.
    pub fn allocate_next(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        chain_id: ChainId,
        cctx_index: &str,
    ) -> Result<u64, TransactionError> {
        if !ObserverRegistry::crosschain_flags(state)?.is_outbound_enabled {
            return Err(NonceError::OutboundDisabled.into());
        }
        ChainParamsRegistry::supported_params(state, chain_id)?;
        let tss = TssKeygen::current_tss(state)?.ok_or(NonceError::NoActiveTss)?;

        let mut chain_nonces = Self::chain_nonces(state, chain_id)?.unwrap_or(ChainNonces {
            chain_id,
            ..Default::default()
        });
        let mut pending = Self::pending_nonces(state, chain_id)?.unwrap_or(PendingNonces {
            chain_id,
            nonce_low: chain_nonces.nonce,
            nonce_high: chain_nonces.nonce,
            tss: tss.tss_pubkey.clone(),
            held: Vec::new(),
            last_advance_height: ctx.block_height,
        });
        if pending.nonce_high != chain_nonces.nonce {
            return Err(TransactionError::InvariantViolation(format!(
                "chain {chain_id}: pending high {} differs from next nonce {}",
                pending.nonce_high, chain_nonces.nonce
            )));
        }
        if self.is_stuck(&pending, ctx.block_height) {
            return Err(NonceError::StuckNonce {
                chain_id,
                nonce_low: pending.nonce_low,
                since: pending.last_advance_height,
            }
            .into());
        }

        let nonce = chain_nonces.nonce;
        let mapping_key = nonce_to_cctx_key(chain_id, nonce);
        if state.get(&mapping_key)?.is_some() {
            return Err(TransactionError::InvariantViolation(format!(
                "chain {chain_id}: nonce {nonce} is already assigned"
            )));
        }
        let next = nonce.checked_add(1).ok_or_else(|| {
            TransactionError::InvariantViolation(format!("chain {chain_id}: nonce space exhausted"))
        })?;

        state.put_typed(
            &mapping_key,
            &NonceToCctx {
                chain_id,
                nonce,
                cctx_index: cctx_index.to_string(),
                tss: tss.tss_pubkey.clone(),
            },
        )?;
        if pending.is_empty() {
            // The staleness clock starts when the range becomes non-empty.
            pending.last_advance_height = ctx.block_height;
        }
        chain_nonces.nonce = next;
        chain_nonces.finalized_height = ctx.block_height;
        pending.nonce_high = next;
        pending.tss = tss.tss_pubkey;
        state.put_typed(&chain_nonces_key(chain_id), &chain_nonces)?;
        state.put_typed(&pending_nonces_key(chain_id), &pending)?;

        let chain_label = chain_id.to_string();
        let metrics = xco_telemetry::observer_metrics();
        metrics.inc_nonces_allocated(&chain_label);
        metrics.set_pending_nonces(&chain_label, pending.len());
        tracing::debug!(
            target: "nonce",
            event = "allocated",
            chain_id = %chain_id,
            nonce,
            cctx_index = %cctx_index,
        );
        ctx.emit(ObserverEvent::NonceAllocated {
            chain_id,
            nonce,
            cctx_index: cctx_index.to_string(),
        });
        Ok(nonce)
    }

    /// Marks `nonce` as confirmed on its destination chain.
    ///
    /// Confirming `nonce_low` advances the range past every contiguous held
    /// nonce. Confirming a higher pending nonce holds it until the gap closes.
    pub fn confirm_nonce(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        chain_id: ChainId,
        nonce: u64,
    ) -> Result<(), TransactionError> {
        let mut pending = Self::pending_nonces(state, chain_id)?
            .ok_or(NonceError::NonceNotPending { chain_id, nonce })?;
        if !pending.contains(nonce) {
            return Err(NonceError::NonceNotPending { chain_id, nonce }.into());
        }

        if nonce == pending.nonce_low {
            pending.nonce_low += 1;
            while pending.held.first() == Some(&pending.nonce_low) {
                pending.held.remove(0);
                pending.nonce_low += 1;
            }
            pending.last_advance_height = ctx.block_height;
        } else {
            match pending.held.binary_search(&nonce) {
                Ok(_) => return Err(NonceError::NonceNotPending { chain_id, nonce }.into()),
                Err(pos) => pending.held.insert(pos, nonce),
            }
        }
        state.put_typed(&pending_nonces_key(chain_id), &pending)?;

        let chain_label = chain_id.to_string();
        let metrics = xco_telemetry::observer_metrics();
        metrics.inc_nonces_confirmed(&chain_label);
        metrics.set_pending_nonces(&chain_label, pending.len());
        tracing::debug!(
            target: "nonce",
            event = "confirmed",
            chain_id = %chain_id,
            nonce,
            nonce_low = pending.nonce_low,
            held = pending.held.len(),
        );
        ctx.emit(ObserverEvent::NonceConfirmed {
            chain_id,
            nonce,
            nonce_low: pending.nonce_low,
        });
        Ok(())
    }

    /// Records one keysign blame for a stuck chain, unless it already has one for `nonce_low`.
    fn report_stuck(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        pending: &PendingNonces,
    ) -> Result<(), TransactionError> {
        let chain_id = pending.chain_id;
        if !BlameRecorder::by_chain_nonce(state, chain_id, pending.nonce_low)?.is_empty() {
            return Ok(());
        }
        let nodes = match TssKeygen::current_tss(state)? {
            Some(tss) if tss.tss_pubkey == pending.tss => {
                tss.tss_participant_list.into_iter().map(BlameNode::named).collect()
            }
            _ => Vec::new(),
        };
        let index = keysign_blame_index(chain_id, pending.nonce_low, &pending.tss);
        let reason = format!(
            "nonce {} on chain {} unconfirmed since height {}",
            pending.nonce_low, chain_id, pending.last_advance_height
        );
        BlameRecorder.record(state, ctx, index, reason, nodes)?;

        xco_telemetry::observer_metrics().inc_stuck_nonces(&chain_id.to_string());
        tracing::warn!(
            target: "nonce",
            event = "stuck",
            chain_id = %chain_id,
            nonce_low = pending.nonce_low,
            since = pending.last_advance_height,
            height = ctx.block_height,
        );
        ctx.emit(ObserverEvent::StuckNonceDetected {
            chain_id,
            nonce_low: pending.nonce_low,
        });
        Ok(())
    }
}

#[service_interface(
    id = "nonce",
    abi_version = 1,
    state_schema = "v1",
    capabilities = "ON_END_BLOCK"
)]
impl NonceAllocator {
    /// Moves an idle chain forward to `nonce`. Refused while the chain has
    /// unconfirmed nonces or when `nonce` is below the chain's next nonce.
    #[method(governance)]
    pub fn reset_chain_nonces(
        &self,
        state: &mut dyn StateAccess,
        params: ResetChainNoncesParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let chain_id = params.chain_id;
        let existing = Self::pending_nonces(state, chain_id)?;
        if existing.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(NonceError::PendingNoncesExist(chain_id).into());
        }
        let tss = match TssKeygen::current_tss(state)? {
            Some(t) => t.tss_pubkey,
            None => existing.map(|p| p.tss).unwrap_or_default(),
        };
        let mut chain_nonces = Self::chain_nonces(state, chain_id)?.unwrap_or(ChainNonces {
            chain_id,
            ..Default::default()
        });
        if params.nonce < chain_nonces.nonce {
            return Err(NonceError::NonceRegression {
                chain_id,
                current: chain_nonces.nonce,
                requested: params.nonce,
            }
            .into());
        }
        chain_nonces.nonce = params.nonce;
        chain_nonces.finalized_height = ctx.block_height;
        state.put_typed(&chain_nonces_key(chain_id), &chain_nonces)?;
        state.put_typed(
            &pending_nonces_key(chain_id),
            &PendingNonces {
                chain_id,
                nonce_low: params.nonce,
                nonce_high: params.nonce,
                tss,
                held: Vec::new(),
                last_advance_height: ctx.block_height,
            },
        )?;
        tracing::info!(
            target: "nonce",
            event = "reset",
            chain_id = %chain_id,
            nonce = params.nonce,
            height = ctx.block_height,
        );
        Ok(())
    }
}

#[async_trait]
impl OnEndBlock for NonceAllocator {
    async fn on_end_block(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
    ) -> Result<(), TransactionError> {
        let stuck: Vec<PendingNonces> = Self::all_pending_nonces(state)?
            .into_iter()
            .filter(|p| self.is_stuck(p, ctx.block_height))
            .collect();
        for pending in &stuck {
            self.report_stuck(state, ctx, pending)?;
        }
        Ok(())
    }
}
