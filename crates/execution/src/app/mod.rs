// Path: crates/execution/src/app/mod.rs
mod end_block;

use crate::error::ExecutionError;
use parity_scale_codec::{Decode, Encode};
use std::sync::Arc;
use xco_api::services::access::ServiceDirectory;
use xco_api::services::BlockchainService;
use xco_api::state::{StateAccess, StateOverlay};
use xco_api::transaction::context::TxContext;
use xco_services::{
    ChainParamsRegistry, CrosschainVoting, NonceAllocator, ObserverRegistry, TssKeygen,
};
use xco_telemetry::time::Timer;
use xco_telemetry::{error_metrics, transition_metrics};
use xco_types::app::{AccountId, ChainId, ObserverEvent};
use xco_types::config::CoreConfig;
use xco_types::error::{ErrorCode, TransactionError};

/// One external input addressed to a service method.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    /// Dispatch id of the target service, e.g. `"crosschain"`.
    pub service_id: String,
    /// Versioned method name, e.g. `"vote_inbound@v1"`.
    pub method: String,
    /// Canonical encoding of the method's parameter struct.
    pub params: Vec<u8>,
}

impl ServiceCall {
    /// Builds a call, encoding `params`.
    pub fn new<P: Encode>(service_id: &str, method: &str, params: &P) -> Self {
        Self {
            service_id: service_id.to_string(),
            method: method.to_string(),
            params: params.encode(),
        }
    }
}

/// A call together with the account that signed it.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub signer: AccountId,
    pub call: ServiceCall,
}

/// What a committed input produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxReceipt {
    pub events: Vec<ObserverEvent>,
}

/// Result of applying one block of inputs.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    pub height: u64,
    /// One entry per input, in input order. Rejections left no trace in state.
    pub results: Vec<Result<TxReceipt, TransactionError>>,
    /// Events emitted by end-block hooks.
    pub end_block_events: Vec<ObserverEvent>,
}

impl BlockOutcome {
    /// Number of inputs that committed.
    pub fn applied(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }
}

/// Applies inputs to the registered services, one commit boundary per input.
#[derive(Debug, Clone)]
pub struct ExecutionMachine {
    services: ServiceDirectory,
    chain_id: ChainId,
}

impl ExecutionMachine {
    pub fn new(chain_id: ChainId, services: Vec<Arc<dyn BlockchainService>>) -> Self {
        Self {
            services: ServiceDirectory::new(services),
            chain_id,
        }
    }

    /// A machine running the full observer service set configured by `config`.
    pub fn with_core_services(config: CoreConfig) -> Self {
        let services: Vec<Arc<dyn BlockchainService>> = vec![
            Arc::new(ObserverRegistry),
            Arc::new(ChainParamsRegistry),
            Arc::new(NonceAllocator::new(config.nonce.clone())),
            Arc::new(TssKeygen),
            Arc::new(CrosschainVoting::new(config.clone())),
        ];
        Self::new(config.local_chain_id, services)
    }

    pub fn services(&self) -> &ServiceDirectory {
        &self.services
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Applies one input. On error nothing is written to `state`.
    pub async fn apply_call(
        &self,
        state: &mut dyn StateAccess,
        signer: AccountId,
        call: &ServiceCall,
        height: u64,
    ) -> Result<TxReceipt, TransactionError> {
        let _timer = Timer::new(transition_metrics(), &call.service_id, &call.method);
        match self.try_apply(state, signer, call, height).await {
            Ok(receipt) => {
                tracing::debug!(
                    target: "execution",
                    event = "applied",
                    service = %call.service_id,
                    method = %call.method,
                    height,
                    events = receipt.events.len(),
                );
                Ok(receipt)
            }
            Err(e) => {
                let code = e.code();
                if e.is_fatal() {
                    tracing::error!(
                        target: "execution",
                        event = "fatal",
                        service = %call.service_id,
                        method = %call.method,
                        signer = %signer,
                        height,
                        code,
                        error = %e,
                    );
                } else {
                    tracing::warn!(
                        target: "execution",
                        event = "rejected",
                        service = %call.service_id,
                        method = %call.method,
                        signer = %signer,
                        height,
                        code,
                        error = %e,
                    );
                }
                error_metrics().inc_error("transaction", code);
                transition_metrics().inc_transition_rejected(&call.service_id, &call.method, code);
                Err(e)
            }
        }
    }

    async fn try_apply(
        &self,
        state: &mut dyn StateAccess,
        signer: AccountId,
        call: &ServiceCall,
        height: u64,
    ) -> Result<TxReceipt, TransactionError> {
        let service = self.services.get_by_id(&call.service_id).ok_or_else(|| {
            TransactionError::Unsupported(format!("Unknown service '{}'", call.service_id))
        })?;
        let mut ctx = TxContext::new(height, self.chain_id, signer, &self.services);
        let (inserts, deletes) = {
            let mut overlay = StateOverlay::new(&*state);
            service
                .handle_service_call(&mut overlay, &call.method, &call.params, &mut ctx)
                .await?;
            overlay.into_ordered_batch()
        };
        state.batch_apply(&inserts, &deletes)?;
        Ok(TxReceipt {
            events: ctx.take_events(),
        })
    }

    /// Runs every end-block hook at `height` and commits their writes together.
    pub async fn end_block(
        &self,
        state: &mut dyn StateAccess,
        height: u64,
    ) -> Result<Vec<ObserverEvent>, ExecutionError> {
        let mut ctx = TxContext::internal(height, self.chain_id, &self.services);
        let (ran, (inserts, deletes)) = {
            let mut overlay = StateOverlay::new(&*state);
            let ran = end_block::run_on_end_block_hooks(&self.services, &mut overlay, &mut ctx).await?;
            (ran, overlay.into_ordered_batch())
        };
        state.batch_apply(&inserts, &deletes)?;
        let events = ctx.take_events();
        tracing::debug!(
            target: "end_block",
            event = "hooks_done",
            height,
            hooks = ran,
            writes = inserts.len() + deletes.len(),
            events = events.len(),
        );
        Ok(events)
    }

    /// Applies `calls` in order, then the end-block hooks.
    ///
    /// Rejected inputs are reported in the outcome and processing continues.
    /// A fatal error aborts the block; inputs committed before it stay committed.
    pub async fn apply_block(
        &self,
        state: &mut dyn StateAccess,
        height: u64,
        calls: &[SignedCall],
    ) -> Result<BlockOutcome, ExecutionError> {
        let mut results = Vec::with_capacity(calls.len());
        for signed in calls {
            match self.apply_call(state, signed.signer, &signed.call, height).await {
                Err(source) if source.is_fatal() => {
                    return Err(ExecutionError::FatalTransition {
                        service_id: signed.call.service_id.clone(),
                        method: signed.call.method.clone(),
                        source,
                    });
                }
                result => results.push(result),
            }
        }
        let end_block_events = self.end_block(state, height).await?;
        let outcome = BlockOutcome {
            height,
            results,
            end_block_events,
        };
        log::info!(
            "Applied block {}: {}/{} inputs committed, {} end-block events",
            height,
            outcome.applied(),
            calls.len(),
            outcome.end_block_events.len()
        );
        Ok(outcome)
    }
}
