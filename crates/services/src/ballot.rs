// Path: crates/services/src/ballot.rs
//! The ballot box: creates ballots over a snapshot of the observer set and
//! applies votes until each ballot finalizes exactly once.

use crate::observer::ObserverRegistry;
use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_types::app::{
    AccountId, Ballot, BallotStatus, NewBallot, NodeStatus, ObservationType, ObserverEvent,
    Threshold, VoteType,
};
use xco_types::config::BallotParams;
use xco_types::error::{ObserverError, StateError, TransactionError};
use xco_types::keys::{
    ballot_height_key, ballot_height_prefix, ballot_key, BALLOT_HEIGHT_PREFIX, BALLOT_PREFIX,
};

/// What a caller supplies to find or open a ballot.
#[derive(Debug, Clone)]
pub struct BallotRequest {
    pub index: String,
    pub identifier: String,
    pub observation_type: ObservationType,
    pub threshold: Threshold,
}

/// Result of applying one vote.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    /// The ballot after the vote.
    pub ballot: Ballot,
    /// True only for the vote that finalized the ballot.
    pub finalized_now: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BallotBox {
    params: BallotParams,
}

impl BallotBox {
    pub fn new(params: BallotParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BallotParams {
        &self.params
    }

    /// Returns the ballot under `req.index`, creating it if it does not exist.
    ///
    /// A new ballot snapshots the active observers of the current set as its
    /// voter list. When weighted voting is configured, each voter weighs its
    /// delegation and observers without delegation are left out.
    pub fn get_or_create(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        req: BallotRequest,
    ) -> Result<Ballot, TransactionError> {
        if let Some(existing) = Self::get_ballot(state, &req.index)? {
            if existing.observation_type != req.observation_type {
                return Err(ObserverError::ObservationTypeMismatch {
                    index: req.index,
                    existing: existing.observation_type.to_string(),
                    requested: req.observation_type.to_string(),
                }
                .into());
            }
            return Ok(existing);
        }

        let set = ObserverRegistry::observer_set(state)?;
        let mut voter_list = Vec::with_capacity(set.len());
        let mut weights = Vec::new();
        for operator in &set.observers {
            let node = ObserverRegistry::node_account(state, operator)?;
            if node.as_ref().is_some_and(|n| n.node_status != NodeStatus::Active) {
                continue;
            }
            if self.params.weighted_voting {
                // A voter without delegation has no say in a weighted ballot.
                let weight = node.map(|n| n.delegation).unwrap_or(0);
                if weight == 0 {
                    continue;
                }
                weights.push(weight);
            }
            voter_list.push(*operator);
        }

        let ballot = Ballot::new(NewBallot {
            index: req.index,
            identifier: req.identifier,
            voter_list,
            weights,
            observation_type: req.observation_type,
            threshold: req.threshold,
            failure_policy: self.params.failure_policy,
            observer_set_version: set.version,
            creation_height: ctx.block_height,
        })?;
        state.put_typed(&ballot_key(&ballot.index), &ballot)?;
        state.put_typed(&ballot_height_key(ballot.creation_height, &ballot.index), &ballot.index)?;

        tracing::debug!(
            target: "ballot",
            event = "created",
            index = %ballot.index,
            observation_type = %ballot.observation_type,
            voters = ballot.voter_list.len(),
            threshold = %ballot.threshold,
            observer_set_version = ballot.observer_set_version,
        );
        ctx.emit(ObserverEvent::BallotCreated {
            index: ballot.index.clone(),
            observation_type: ballot.observation_type,
        });
        Ok(ballot)
    }

    /// Records `voter`'s vote on the ballot under `index`.
    ///
    /// A rejected vote leaves state untouched and may be retried.
    pub fn add_vote(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        index: &str,
        voter: &AccountId,
        vote: VoteType,
    ) -> Result<VoteOutcome, TransactionError> {
        let mut ballot = Self::get_ballot(state, index)?
            .ok_or_else(|| ObserverError::BallotNotFound(index.to_string()))?;
        let finalized_now = ballot.add_vote(voter, vote, ctx.block_height)?;
        state.put_typed(&ballot_key(&ballot.index), &ballot)?;

        let observation_type = ballot.observation_type.to_string();
        xco_telemetry::observer_metrics().inc_votes_cast(&observation_type);
        ctx.emit(ObserverEvent::VoteCast {
            index: ballot.index.clone(),
            voter: *voter,
            vote,
        });

        if finalized_now {
            let outcome = match ballot.status {
                BallotStatus::FinalizedSuccess => "success",
                _ => "failure",
            };
            xco_telemetry::observer_metrics().inc_ballots_finalized(&observation_type, outcome);
            let tally = ballot.tally();
            tracing::info!(
                target: "ballot",
                event = "finalized",
                index = %ballot.index,
                outcome,
                success = tally.success,
                failure = tally.failure,
                total = tally.total,
                height = ctx.block_height,
            );
            ctx.emit(ObserverEvent::BallotFinalized {
                index: ballot.index.clone(),
                status: ballot.status,
                height: ctx.block_height,
            });
        }
        Ok(VoteOutcome {
            ballot,
            finalized_now,
        })
    }

    pub fn get_ballot(state: &dyn StateAccess, index: &str) -> Result<Option<Ballot>, TransactionError> {
        Ok(state.get_typed(&ballot_key(index))?)
    }

    /// Every ballot with `status`, ordered by index.
    pub fn ballots_by_status(
        state: &dyn StateAccess,
        status: BallotStatus,
    ) -> Result<Vec<Ballot>, TransactionError> {
        Ok(state
            .scan_typed::<Ballot>(BALLOT_PREFIX)?
            .into_iter()
            .map(|(_, b)| b)
            .filter(|b| b.status == status)
            .collect())
    }

    /// Ballots created at exactly `height`.
    pub fn ballots_at_height(state: &dyn StateAccess, height: u64) -> Result<Vec<Ballot>, TransactionError> {
        let indices = state.scan_typed::<String>(&ballot_height_prefix(height))?;
        Self::load_all(state, indices.into_iter().map(|(_, i)| i))
    }

    /// Ballots created at or before `height`, oldest first.
    pub fn ballots_created_at_or_before(
        state: &dyn StateAccess,
        height: u64,
    ) -> Result<Vec<Ballot>, TransactionError> {
        let mut indices = Vec::new();
        for (key, index) in state.scan_typed::<String>(BALLOT_HEIGHT_PREFIX)? {
            let created = key
                .get(BALLOT_HEIGHT_PREFIX.len()..BALLOT_HEIGHT_PREFIX.len() + 8)
                .and_then(|b| <[u8; 8]>::try_from(b).ok())
                .map(u64::from_be_bytes)
                .ok_or_else(|| StateError::Decode("malformed ballot height key".into()))?;
            if created > height {
                break;
            }
            indices.push(index);
        }
        Self::load_all(state, indices.into_iter())
    }

    fn load_all(
        state: &dyn StateAccess,
        indices: impl Iterator<Item = String>,
    ) -> Result<Vec<Ballot>, TransactionError> {
        let mut out = Vec::new();
        for index in indices {
            let ballot = Self::get_ballot(state, &index)?.ok_or_else(|| {
                TransactionError::InvariantViolation(format!("height index names missing ballot {index}"))
            })?;
            out.push(ballot);
        }
        Ok(out)
    }
}
