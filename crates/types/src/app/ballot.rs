// Path: crates/types/src/app/ballot.rs
//! Ballots and the threshold tally that finalizes them.

use super::{AccountId, ChainId, Threshold};
use crate::error::ObserverError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A single observer's vote slot on a ballot.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoteType {
    /// The initial slot value. Never castable.
    #[default]
    NotYetVoted,
    /// The observer saw the event as described.
    Success,
    /// The observer saw the event fail or saw a conflicting event.
    Failure,
}

/// Lifecycle of a ballot. Only moves forward, exactly once.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BallotStatus {
    /// Accepting votes.
    #[default]
    InProgress,
    /// The success threshold was met.
    FinalizedSuccess,
    /// The success threshold was missed conclusively.
    FinalizedFailure,
}

impl BallotStatus {
    /// True for both finalized states.
    pub fn is_finalized(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// What kind of external event a ballot is about.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationType {
    /// A deposit observed on an external chain.
    Inbound,
    /// Confirmation of an outbound transaction on an external chain.
    Outbound,
    /// The outcome of a TSS key-generation ceremony.
    TssKeygen,
    /// Any other observation.
    Other,
}

impl ObservationType {
    fn tag(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::TssKeygen => "tss_keygen",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a ballot decides that it has failed.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail as soon as the success threshold can no longer be reached.
    #[default]
    SuccessUnreachable,
    /// Fail only when the failure weight itself meets the threshold, or when
    /// every voter has voted without success.
    FailureThreshold,
}

/// Aggregated weights of a ballot's vote slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BallotTally {
    /// Weight of `Success` votes.
    pub success: u64,
    /// Weight of `Failure` votes.
    pub failure: u64,
    /// Weight of voters that have not voted yet.
    pub pending: u64,
    /// Total weight of the voter list.
    pub total: u64,
}

/// A voting record about one external event.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Unique fingerprint of the observed event.
    pub index: String,
    /// Human-readable label.
    pub identifier: String,
    /// Voters snapshotted from the observer set at creation.
    pub voter_list: Vec<AccountId>,
    /// One slot per voter, parallel to `voter_list`.
    pub votes: Vec<VoteType>,
    /// Per-voter weights. Empty means every voter weighs one.
    pub weights: Vec<u64>,
    /// The kind of event being voted on.
    pub observation_type: ObservationType,
    /// Fraction of total weight that must vote `Success`.
    pub threshold: Threshold,
    /// Failure rule captured at creation.
    pub failure_policy: FailurePolicy,
    /// Current status.
    pub status: BallotStatus,
    /// Height at which the ballot was created.
    pub creation_height: u64,
    /// Height at which the ballot finalized, if it has.
    pub finalized_height: Option<u64>,
    /// Version of the observer set the voter list was taken from.
    pub observer_set_version: u64,
}

/// Parameters for creating a new ballot.
#[derive(Debug, Clone)]
pub struct NewBallot {
    /// Unique fingerprint of the observed event.
    pub index: String,
    /// Human-readable label.
    pub identifier: String,
    /// Expected voters.
    pub voter_list: Vec<AccountId>,
    /// Optional per-voter weights.
    pub weights: Vec<u64>,
    /// The kind of event.
    pub observation_type: ObservationType,
    /// Success threshold.
    pub threshold: Threshold,
    /// Failure rule.
    pub failure_policy: FailurePolicy,
    /// Observer set version the voters come from.
    pub observer_set_version: u64,
    /// Current height.
    pub creation_height: u64,
}

impl Ballot {
    /// Creates an in-progress ballot with every slot unset.
    pub fn new(params: NewBallot) -> Result<Self, ObserverError> {
        if params.voter_list.is_empty() {
            return Err(ObserverError::EmptyVoterList);
        }
        if !params.weights.is_empty() {
            if params.weights.len() != params.voter_list.len() {
                return Err(ObserverError::WeightsMismatch {
                    voters: params.voter_list.len(),
                    weights: params.weights.len(),
                });
            }
            if params.weights.iter().all(|w| *w == 0) {
                return Err(ObserverError::EmptyVoterList);
            }
        }
        let votes = vec![VoteType::NotYetVoted; params.voter_list.len()];
        Ok(Self {
            index: params.index,
            identifier: params.identifier,
            voter_list: params.voter_list,
            votes,
            weights: params.weights,
            observation_type: params.observation_type,
            threshold: params.threshold,
            failure_policy: params.failure_policy,
            status: BallotStatus::InProgress,
            creation_height: params.creation_height,
            finalized_height: None,
            observer_set_version: params.observer_set_version,
        })
    }

    /// Position of `voter` in the voter list.
    pub fn voter_position(&self, voter: &AccountId) -> Option<usize> {
        self.voter_list.iter().position(|v| v == voter)
    }

    /// True if `voter` has cast a vote.
    pub fn has_voted(&self, voter: &AccountId) -> bool {
        self.voter_position(voter)
            .and_then(|i| self.votes.get(i))
            .is_some_and(|v| *v != VoteType::NotYetVoted)
    }

    /// True once the ballot is finalized either way.
    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }

    fn weight_at(&self, i: usize) -> u64 {
        if self.weights.is_empty() {
            1
        } else {
            self.weights.get(i).copied().unwrap_or(0)
        }
    }

    /// Sums the weight behind each kind of slot.
    pub fn tally(&self) -> BallotTally {
        let mut tally = BallotTally::default();
        for (i, vote) in self.votes.iter().enumerate() {
            let w = self.weight_at(i);
            tally.total = tally.total.saturating_add(w);
            match vote {
                VoteType::Success => tally.success = tally.success.saturating_add(w),
                VoteType::Failure => tally.failure = tally.failure.saturating_add(w),
                VoteType::NotYetVoted => tally.pending = tally.pending.saturating_add(w),
            }
        }
        tally
    }

    /// The status the current votes imply.
    pub fn evaluate(&self) -> BallotStatus {
        let t = self.tally();
        if t.success > 0 && self.threshold.is_met(t.success, t.total) {
            return BallotStatus::FinalizedSuccess;
        }
        let failed = match self.failure_policy {
            FailurePolicy::SuccessUnreachable => {
                let reachable = t.success.saturating_add(t.pending);
                reachable == 0 || !self.threshold.is_met(reachable, t.total)
            }
            FailurePolicy::FailureThreshold => {
                (t.failure > 0 && self.threshold.is_met(t.failure, t.total)) || t.pending == 0
            }
        };
        if failed {
            BallotStatus::FinalizedFailure
        } else {
            BallotStatus::InProgress
        }
    }

    /// Records a vote and finalizes the ballot if the tally is now decisive.
    ///
    /// Returns `true` only on the call that finalizes the ballot. On error the
    /// ballot is left untouched.
    pub fn add_vote(
        &mut self,
        voter: &AccountId,
        vote: VoteType,
        height: u64,
    ) -> Result<bool, ObserverError> {
        if vote == VoteType::NotYetVoted {
            return Err(ObserverError::InvalidVote);
        }
        let pos = self
            .voter_position(voter)
            .ok_or(ObserverError::UnknownVoter(*voter))?;
        let slot = self
            .votes
            .get(pos)
            .copied()
            .ok_or(ObserverError::UnknownVoter(*voter))?;
        if slot != VoteType::NotYetVoted {
            return Err(ObserverError::AlreadyVoted(*voter));
        }
        if self.is_finalized() {
            return Err(ObserverError::BallotFinalized(self.index.clone()));
        }
        if let Some(s) = self.votes.get_mut(pos) {
            *s = vote;
        }
        let next = self.evaluate();
        if next.is_finalized() {
            self.status = next;
            self.finalized_height = Some(height);
            return Ok(true);
        }
        Ok(false)
    }

    /// Voters whose slot holds `vote`, in voter-list order.
    pub fn voters_with(&self, vote: VoteType) -> Vec<AccountId> {
        self.voter_list
            .iter()
            .zip(self.votes.iter())
            .filter(|(_, v)| **v == vote)
            .map(|(a, _)| *a)
            .collect()
    }
}

/// Fingerprint of an observed event: hex SHA-256 over chain, tx identifier and type.
pub fn ballot_index(chain_id: ChainId, tx_identifier: &str, observation_type: ObservationType) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chain_id.0.to_be_bytes());
    hasher.update(b"|");
    hasher.update(tx_identifier.as_bytes());
    hasher.update(b"|");
    hasher.update(observation_type.tag().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(b: u8) -> AccountId {
        AccountId([b; 32])
    }

    fn ballot(n: u8, threshold: &str, policy: FailurePolicy) -> Ballot {
        Ballot::new(NewBallot {
            index: "idx".into(),
            identifier: "test".into(),
            voter_list: (1..=n).map(acct).collect(),
            weights: vec![],
            observation_type: ObservationType::Inbound,
            threshold: threshold.parse().unwrap(),
            failure_policy: policy,
            observer_set_version: 1,
            creation_height: 10,
        })
        .unwrap()
    }

    #[test]
    fn finalizes_success_when_threshold_crossed() {
        let mut b = ballot(3, "0.5", FailurePolicy::SuccessUnreachable);
        assert!(!b.add_vote(&acct(1), VoteType::Success, 11).unwrap());
        assert_eq!(b.status, BallotStatus::InProgress);
        assert!(b.add_vote(&acct(2), VoteType::Success, 12).unwrap());
        assert_eq!(b.status, BallotStatus::FinalizedSuccess);
        assert_eq!(b.finalized_height, Some(12));
        assert_eq!(
            b.add_vote(&acct(3), VoteType::Success, 13),
            Err(ObserverError::BallotFinalized("idx".into()))
        );
    }

    #[test]
    fn zero_threshold_finalizes_on_first_success() {
        let mut b = ballot(4, "0", FailurePolicy::SuccessUnreachable);
        assert!(!b.add_vote(&acct(1), VoteType::Failure, 11).unwrap());
        assert!(b.add_vote(&acct(2), VoteType::Success, 11).unwrap());
        assert_eq!(b.status, BallotStatus::FinalizedSuccess);
    }

    #[test]
    fn unreachable_success_finalizes_failure() {
        let mut b = ballot(3, "0.66", FailurePolicy::SuccessUnreachable);
        assert!(!b.add_vote(&acct(1), VoteType::Failure, 11).unwrap());
        assert!(b.add_vote(&acct(2), VoteType::Failure, 12).unwrap());
        assert_eq!(b.status, BallotStatus::FinalizedFailure);
        assert_eq!(b.voters_with(VoteType::Failure), vec![acct(1), acct(2)]);
    }

    #[test]
    fn failure_threshold_policy_waits_for_failure_weight() {
        let mut b = ballot(4, "0.75", FailurePolicy::FailureThreshold);
        assert!(!b.add_vote(&acct(1), VoteType::Failure, 11).unwrap());
        assert!(!b.add_vote(&acct(2), VoteType::Failure, 11).unwrap());
        assert_eq!(b.status, BallotStatus::InProgress);
        assert!(b.add_vote(&acct(3), VoteType::Failure, 11).unwrap());
        assert_eq!(b.status, BallotStatus::FinalizedFailure);
    }

    #[test]
    fn all_voted_without_decision_fails() {
        let mut b = ballot(2, "1", FailurePolicy::FailureThreshold);
        assert!(!b.add_vote(&acct(1), VoteType::Success, 11).unwrap());
        assert!(b.add_vote(&acct(2), VoteType::Failure, 11).unwrap());
        assert_eq!(b.status, BallotStatus::FinalizedFailure);
    }

    #[test]
    fn rejects_misuse_without_mutation() {
        let mut b = ballot(3, "1", FailurePolicy::SuccessUnreachable);
        assert_eq!(
            b.add_vote(&acct(9), VoteType::Success, 11),
            Err(ObserverError::UnknownVoter(acct(9)))
        );
        assert_eq!(b.add_vote(&acct(1), VoteType::NotYetVoted, 11), Err(ObserverError::InvalidVote));
        b.add_vote(&acct(1), VoteType::Success, 11).unwrap();
        assert!(b.has_voted(&acct(1)));
        assert!(!b.has_voted(&acct(2)));
        let snapshot = b.clone();
        assert_eq!(
            b.add_vote(&acct(1), VoteType::Success, 12),
            Err(ObserverError::AlreadyVoted(acct(1)))
        );
        assert_eq!(b, snapshot);
    }

    #[test]
    fn weighted_tally_uses_delegation() {
        let mut b = Ballot::new(NewBallot {
            index: "w".into(),
            identifier: "weighted".into(),
            voter_list: vec![acct(1), acct(2), acct(3)],
            weights: vec![6, 2, 2],
            observation_type: ObservationType::Outbound,
            threshold: "0.5".parse().unwrap(),
            failure_policy: FailurePolicy::SuccessUnreachable,
            observer_set_version: 1,
            creation_height: 1,
        })
        .unwrap();
        assert!(b.add_vote(&acct(1), VoteType::Success, 2).unwrap());
        assert_eq!(b.tally(), BallotTally { success: 6, failure: 0, pending: 4, total: 10 });
    }

    #[test]
    fn rejects_empty_and_mismatched_voters() {
        let mut params = NewBallot {
            index: "e".into(),
            identifier: String::new(),
            voter_list: vec![],
            weights: vec![],
            observation_type: ObservationType::Other,
            threshold: Threshold::ONE,
            failure_policy: FailurePolicy::default(),
            observer_set_version: 0,
            creation_height: 0,
        };
        assert_eq!(Ballot::new(params.clone()), Err(ObserverError::EmptyVoterList));
        params.voter_list = vec![acct(1)];
        params.weights = vec![1, 2];
        assert!(matches!(Ballot::new(params), Err(ObserverError::WeightsMismatch { .. })));
    }

    #[test]
    fn ballot_index_is_stable_and_type_sensitive() {
        let a = ballot_index(ChainId(1), "0xabc", ObservationType::Inbound);
        let b = ballot_index(ChainId(1), "0xabc", ObservationType::Inbound);
        let c = ballot_index(ChainId(1), "0xabc", ObservationType::Outbound);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
