// Path: crates/services/tests/ballot_properties.rs
use proptest::prelude::*;
use xco_api::services::access::ServiceDirectory;
use xco_api::state::{MemoryState, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_services::ballot::BallotRequest;
use xco_services::BallotBox;
use xco_test_utils::sample;
use xco_types::app::{BallotStatus, ObservationType, VoteType};
use xco_types::error::{ErrorCode, TransactionError};
use xco_types::keys::{node_account_key, OBSERVER_SET_KEY};

fn vote_type() -> impl Strategy<Value = VoteType> {
    prop_oneof![Just(VoteType::Success), Just(VoteType::Failure)]
}

fn threshold() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("0.34"), Just("0.5"), Just("0.66"), Just("1")]
}

proptest! {
    #[test]
    fn ballot_finalizes_exactly_once(
        votes in prop::collection::vec(vote_type(), 1..8),
        threshold in threshold(),
    ) {
        let services = ServiceDirectory::default();
        let mut state = MemoryState::new();
        let set = sample::observer_set(votes.len() as u8);
        for op in &set.observers {
            state.put_typed(&node_account_key(op), &sample::node_account(*op)).unwrap();
        }
        state.put_typed(OBSERVER_SET_KEY, &set).unwrap();

        let bb = BallotBox::default();
        let mut ctx = TxContext::new(1, Default::default(), sample::account(1), &services);
        let req = BallotRequest {
            index: "prop".into(),
            identifier: "prop-id".into(),
            observation_type: ObservationType::Other,
            threshold: threshold.parse().unwrap(),
        };
        bb.get_or_create(&mut state, &mut ctx, req).unwrap();

        let mut finalized_at = None;
        for (i, (voter, vote)) in set.observers.iter().zip(&votes).enumerate() {
            let height = i as u64 + 2;
            let mut ctx = TxContext::new(height, Default::default(), *voter, &services);
            match bb.add_vote(&mut state, &mut ctx, "prop", voter, *vote) {
                Ok(outcome) => {
                    prop_assert!(finalized_at.is_none());
                    if outcome.finalized_now {
                        prop_assert_ne!(outcome.ballot.status, BallotStatus::InProgress);
                        prop_assert_eq!(outcome.ballot.finalized_height, Some(height));
                        finalized_at = Some((height, outcome.ballot.status));
                    } else {
                        prop_assert_eq!(outcome.ballot.status, BallotStatus::InProgress);
                    }
                }
                Err(err) => {
                    prop_assert!(finalized_at.is_some());
                    prop_assert_eq!(err.code(), "OBSERVER_BALLOT_FINALIZED");
                    prop_assert!(matches!(err, TransactionError::Observer(_)));
                }
            }
        }

        // Every observer voted or the ballot closed early; either way it is decided.
        let (height, status) = finalized_at.unwrap();
        let stored = BallotBox::get_ballot(&state, "prop").unwrap().unwrap();
        prop_assert_eq!(stored.status, status);
        prop_assert_eq!(stored.finalized_height, Some(height));
        prop_assert_eq!(BallotBox::ballots_by_status(&state, BallotStatus::InProgress).unwrap().len(), 0);
    }
}
