// Path: crates/services/src/voting.rs
//! Observation votes and what a finalized ballot triggers.
//!
//! An observer's vote goes to the ballot fingerprinting the observed event.
//! The vote that finalizes a ballot also applies the decision: an inbound
//! success allocates an outbound nonce, an outbound success confirms one, a
//! keygen ballot completes the pending ceremony. A failed keygen ballot is
//! blamed by the ceremony itself; every other failed ballot leaves a blame
//! naming the observers that voted for the losing side.

use crate::ballot::{BallotBox, BallotRequest};
use crate::blame::BlameRecorder;
use crate::chain_params::ChainParamsRegistry;
use crate::nonce::NonceAllocator;
use crate::observer::ObserverRegistry;
use crate::tss::TssKeygen;
use parity_scale_codec::{Decode, Encode};
use std::sync::Arc;
use xco_api::state::{StateAccess, StateOverlay};
use xco_api::transaction::context::TxContext;
use xco_macros::service_interface;
use xco_types::app::{
    ballot_blame_index, ballot_index, Ballot, BallotStatus, BlameNode, ChainId, ObservationType,
    ObserverEvent, Threshold, VoteType,
};
use xco_types::config::CoreConfig;
use xco_types::error::{ErrorCode, NonceError, ObserverError, TransactionError, TssError};

#[derive(Encode, Decode, Debug, Clone)]
pub struct VoteInboundParams {
    pub sender_chain_id: ChainId,
    pub receiver_chain_id: ChainId,
    pub in_tx_hash: String,
    pub event_index: u64,
    pub vote: VoteType,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct VoteOutboundParams {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub outbound_tx_hash: String,
    pub vote: VoteType,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct VoteTssParams {
    pub tss_pubkey: String,
    pub keygen_height: u64,
    pub vote: VoteType,
    /// Nodes the voter holds responsible if the ceremony failed.
    pub blame_nodes: Vec<BlameNode>,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct VoteParams {
    pub index: String,
    pub identifier: String,
    pub chain_id: ChainId,
    pub observation_type: ObservationType,
    pub vote: VoteType,
}

/// Inbound ballot identity: one ballot per event of a deposit.
pub fn inbound_ballot_index(
    sender_chain_id: ChainId,
    receiver_chain_id: ChainId,
    in_tx_hash: &str,
    event_index: u64,
) -> String {
    ballot_index(
        sender_chain_id,
        &format!("{in_tx_hash}:{event_index}:{receiver_chain_id}"),
        ObservationType::Inbound,
    )
}

/// Outbound ballot identity: one ballot per (nonce, destination tx).
pub fn outbound_ballot_index(chain_id: ChainId, nonce: u64, outbound_tx_hash: &str) -> String {
    ballot_index(chain_id, &format!("{nonce}:{outbound_tx_hash}"), ObservationType::Outbound)
}

/// Keygen ballot identity: one ballot per (ceremony, proposed key).
pub fn tss_ballot_index(local_chain_id: ChainId, attempt: u64, keygen_height: u64, tss_pubkey: &str) -> String {
    ballot_index(
        local_chain_id,
        &format!("{attempt}:{keygen_height}:{tss_pubkey}"),
        ObservationType::TssKeygen,
    )
}

#[derive(Debug, Clone, Default)]
pub struct CrosschainVoting {
    config: CoreConfig,
    ballots: BallotBox,
}

impl CrosschainVoting {
    pub fn new(config: CoreConfig) -> Self {
        let ballots = BallotBox::new(config.ballot.clone());
        Self { config, ballots }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn ballot_box(&self) -> &BallotBox {
        &self.ballots
    }

    fn chain_threshold(&self, state: &dyn StateAccess, chain_id: ChainId) -> Result<Threshold, TransactionError> {
        Ok(ChainParamsRegistry::get_params(state, chain_id)?
            .map(|p| p.ballot_threshold)
            .unwrap_or(self.config.ballot.default_threshold))
    }

    fn nonce_allocator(ctx: &TxContext<'_>) -> Result<Arc<NonceAllocator>, TransactionError> {
        ctx.services
            .get::<NonceAllocator>()
            .ok_or_else(|| TransactionError::Unsupported("nonce service is not registered".into()))
    }

    fn tss_keygen(ctx: &TxContext<'_>) -> Result<Arc<TssKeygen>, TransactionError> {
        ctx.services
            .get::<TssKeygen>()
            .ok_or_else(|| TransactionError::Unsupported("tss service is not registered".into()))
    }

    /// Allocates a nonce for a cctx whose inbound ballot just finalized.
    ///
    /// A refusal does not undo the finalization: it is logged and reported as
    /// [`ObserverEvent::OutboundAllocationFailed`]. Only fatal errors propagate.
    fn assign_outbound_nonce(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        chain_id: ChainId,
        cctx_index: &str,
    ) -> Result<(), TransactionError> {
        let allocator = Self::nonce_allocator(ctx)?;
        let attempt = {
            let mut scratch = StateOverlay::new(&*state);
            allocator
                .allocate_next(&mut scratch, ctx, chain_id, cctx_index)
                .map(|_| scratch.into_ordered_batch())
        };
        match attempt {
            Ok((inserts, deletes)) => {
                state.batch_apply(&inserts, &deletes)?;
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(
                    target: "crosschain",
                    event = "allocation_refused",
                    chain_id = %chain_id,
                    cctx = cctx_index,
                    code = e.code(),
                    error = %e,
                );
                ctx.emit(ObserverEvent::OutboundAllocationFailed {
                    cctx_index: cctx_index.to_string(),
                    chain_id,
                    code: e.code().to_string(),
                });
                Ok(())
            }
        }
    }

    /// Opens the ballot if needed and applies the signer's vote.
    fn cast(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        req: BallotRequest,
        vote: VoteType,
    ) -> Result<(Ballot, bool), TransactionError> {
        let voter = ctx.signer_account_id;
        ObserverRegistry::require_active_observer(state, &voter)?;
        let ballot = self.ballots.get_or_create(state, ctx, req)?;
        let outcome = self.ballots.add_vote(state, ctx, &ballot.index, &voter, vote)?;
        if outcome.finalized_now
            && outcome.ballot.status == BallotStatus::FinalizedFailure
            && outcome.ballot.observation_type != ObservationType::TssKeygen
        {
            let nodes = outcome
                .ballot
                .voters_with(VoteType::Success)
                .iter()
                .map(|a| BlameNode::named(a.to_string()))
                .collect();
            BlameRecorder.record(
                state,
                ctx,
                ballot_blame_index(&outcome.ballot.index),
                format!("{} ballot failed", outcome.ballot.observation_type),
                nodes,
            )?;
        }
        Ok((outcome.ballot, outcome.finalized_now))
    }
}

#[service_interface(id = "crosschain", abi_version = 1, state_schema = "v1")]
impl CrosschainVoting {
    /// Votes on a deposit observed on `sender_chain_id`.
    #[method]
    pub fn vote_inbound(
        &self,
        state: &mut dyn StateAccess,
        params: VoteInboundParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        if !ObserverRegistry::crosschain_flags(state)?.is_inbound_enabled {
            return Err(ObserverError::InboundDisabled.into());
        }
        let sender = ChainParamsRegistry::supported_params(state, params.sender_chain_id)?;
        let foreign_receiver = params.receiver_chain_id != self.config.local_chain_id;
        if foreign_receiver {
            ChainParamsRegistry::supported_params(state, params.receiver_chain_id)?;
        }
        let index = inbound_ballot_index(
            params.sender_chain_id,
            params.receiver_chain_id,
            &params.in_tx_hash,
            params.event_index,
        );
        let req = BallotRequest {
            index,
            identifier: format!("inbound:{}:{}", params.sender_chain_id, params.in_tx_hash),
            observation_type: ObservationType::Inbound,
            threshold: sender.ballot_threshold,
        };
        let (ballot, finalized_now) = self.cast(state, ctx, req, params.vote)?;
        if finalized_now && ballot.status == BallotStatus::FinalizedSuccess && foreign_receiver {
            self.assign_outbound_nonce(state, ctx, params.receiver_chain_id, &ballot.index)?;
        }
        Ok(())
    }

    /// Votes on the result of outbound transaction `nonce` on `chain_id`.
    #[method]
    pub fn vote_outbound(
        &self,
        state: &mut dyn StateAccess,
        params: VoteOutboundParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let pending = NonceAllocator::pending_nonces(state, params.chain_id)?;
        let is_pending = pending
            .as_ref()
            .is_some_and(|p| p.contains(params.nonce) && p.held.binary_search(&params.nonce).is_err());
        if !is_pending {
            return Err(NonceError::NonceNotPending {
                chain_id: params.chain_id,
                nonce: params.nonce,
            }
            .into());
        }
        let req = BallotRequest {
            index: outbound_ballot_index(params.chain_id, params.nonce, &params.outbound_tx_hash),
            identifier: format!("outbound:{}:{}", params.chain_id, params.nonce),
            observation_type: ObservationType::Outbound,
            threshold: self.chain_threshold(state, params.chain_id)?,
        };
        let (ballot, finalized_now) = self.cast(state, ctx, req, params.vote)?;
        if finalized_now && ballot.status == BallotStatus::FinalizedSuccess {
            let allocator = Self::nonce_allocator(ctx)?;
            allocator.confirm_nonce(state, ctx, params.chain_id, params.nonce)?;
        }
        Ok(())
    }

    /// Votes on the outcome of the pending keygen ceremony.
    #[method]
    pub fn vote_tss(
        &self,
        state: &mut dyn StateAccess,
        params: VoteTssParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let keygen = TssKeygen::pending_keygen(state)?;
        if keygen.block_number != params.keygen_height {
            return Err(TssError::KeygenHeightMismatch {
                expected: keygen.block_number,
                got: params.keygen_height,
            }
            .into());
        }
        let req = BallotRequest {
            index: tss_ballot_index(
                self.config.local_chain_id,
                keygen.attempt,
                params.keygen_height,
                &params.tss_pubkey,
            ),
            identifier: format!("keygen:{}:{}", keygen.attempt, params.keygen_height),
            observation_type: ObservationType::TssKeygen,
            threshold: self.config.tss.keygen_ballot_threshold,
        };
        let (ballot, finalized_now) = self.cast(state, ctx, req, params.vote)?;
        if !finalized_now {
            return Ok(());
        }
        let machine = Self::tss_keygen(ctx)?;
        match ballot.status {
            BallotStatus::FinalizedSuccess => {
                let operators = ballot.voters_with(VoteType::Success);
                machine.keygen_succeeded(state, ctx, params.tss_pubkey, &operators)?;
            }
            BallotStatus::FinalizedFailure => {
                machine.keygen_failed(
                    state,
                    ctx,
                    format!("keygen ballot {} failed", ballot.index),
                    params.blame_nodes,
                )?;
            }
            BallotStatus::InProgress => {}
        }
        Ok(())
    }

    /// Votes on any other observation. Only the decision is recorded.
    #[method]
    pub fn vote(
        &self,
        state: &mut dyn StateAccess,
        params: VoteParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        if params.observation_type != ObservationType::Other {
            return Err(TransactionError::Invalid(format!(
                "{} observations have a dedicated vote method",
                params.observation_type
            )));
        }
        let req = BallotRequest {
            index: params.index,
            identifier: params.identifier,
            observation_type: params.observation_type,
            threshold: self.chain_threshold(state, params.chain_id)?,
        };
        self.cast(state, ctx, req, params.vote)?;
        Ok(())
    }
}
