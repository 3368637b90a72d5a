// Path: crates/execution/tests/block.rs
use xco_api::state::{MemoryState, StateAccessExt};
use xco_execution::{ExecutionError, ExecutionMachine, ServiceCall, SignedCall};
use xco_services::genesis::{export_genesis, init_genesis};
use xco_services::voting::{inbound_ballot_index, VoteInboundParams};
use xco_services::NonceAllocator;
use xco_test_utils::{assert_err_code, assert_ok, sample};
use xco_types::app::{ballot_blame_index, AccountId, ChainId, ObserverEvent, VoteType};
use xco_types::config::{CoreConfig, GenesisState};
use xco_types::error::ErrorCode;
use xco_types::keys::blame_key;
use xco_types::service_configs::{GovernancePolicy, GovernanceSigner};

const LOCAL: ChainId = ChainId(7000);
const ETH: ChainId = ChainId(1);
const BSC: ChainId = ChainId(56);

fn setup(observers: u8) -> (ExecutionMachine, MemoryState, Vec<AccountId>) {
    let accounts = sample::observers(observers);
    let genesis = GenesisState {
        governance: Some(GovernancePolicy {
            signer: GovernanceSigner::Single(sample::account(200)),
        }),
        node_accounts: accounts.iter().map(|a| sample::node_account(*a)).collect(),
        chain_params: vec![
            sample::chain_params_supported(ETH.0),
            sample::chain_params_supported(BSC.0),
        ],
        tss: Some(sample::tss("exec")),
        ..Default::default()
    };
    let mut state = MemoryState::new();
    init_genesis(&mut state, &genesis).unwrap();
    let machine = ExecutionMachine::with_core_services(CoreConfig {
        local_chain_id: LOCAL,
        ..Default::default()
    });
    (machine, state, accounts)
}

fn inbound(signer: AccountId, hash: &str, vote: VoteType) -> SignedCall {
    SignedCall {
        signer,
        call: ServiceCall::new(
            "crosschain",
            "vote_inbound@v1",
            &VoteInboundParams {
                sender_chain_id: ETH,
                receiver_chain_id: BSC,
                in_tx_hash: hash.to_string(),
                event_index: 0,
                vote,
            },
        ),
    }
}

#[tokio::test]
async fn block_commits_inputs_and_reports_rejections() {
    let (machine, mut state, obs) = setup(2);
    let calls = vec![
        inbound(obs[0], "0xaa", VoteType::Success),
        // Threshold 0.5 of two observers: the first vote already decided.
        inbound(obs[1], "0xaa", VoteType::Success),
        inbound(sample::account(250), "0xbb", VoteType::Success),
    ];
    let outcome = assert_ok!(machine.apply_block(&mut state, 1_100, &calls).await);
    assert_eq!(outcome.height, 1_100);
    assert_eq!(outcome.applied(), 1);

    let receipt = outcome.results[0].as_ref().unwrap();
    assert!(receipt.events.iter().any(|e| matches!(
        e,
        ObserverEvent::NonceAllocated { chain_id, nonce: 0, .. } if *chain_id == BSC
    )));
    assert_eq!(
        outcome.results[1].as_ref().unwrap_err().code(),
        "OBSERVER_BALLOT_FINALIZED"
    );
    assert_eq!(
        outcome.results[2].as_ref().unwrap_err().code(),
        "OBSERVER_NOT_AN_OBSERVER"
    );
    assert!(outcome.end_block_events.is_empty());

    let pending = NonceAllocator::pending_nonces(&state, BSC).unwrap().unwrap();
    assert_eq!((pending.nonce_low, pending.nonce_high), (0, 1));
}

#[tokio::test]
async fn rejected_call_leaves_state_untouched() {
    let (machine, mut state, obs) = setup(2);
    let before = export_genesis(&state).unwrap();

    let unknown = ServiceCall::new("bank", "transfer@v1", &0u64);
    assert_err_code!(
        machine.apply_call(&mut state, obs[0], &unknown, 5).await,
        "TX_UNSUPPORTED"
    );
    let bad_method = ServiceCall::new("crosschain", "vote_sideways@v1", &0u64);
    assert_err_code!(
        machine.apply_call(&mut state, obs[0], &bad_method, 5).await,
        "TX_UNSUPPORTED"
    );
    let garbage = ServiceCall {
        service_id: "crosschain".into(),
        method: "vote_inbound@v1".into(),
        params: vec![0xff, 0x01],
    };
    assert_err_code!(
        machine.apply_call(&mut state, obs[0], &garbage, 5).await,
        "TX_DESERIALIZATION_ERROR"
    );

    assert_eq!(export_genesis(&state).unwrap(), before);
}

#[tokio::test]
async fn end_block_reports_stuck_ranges() {
    let (machine, mut state, obs) = setup(1);
    let calls = vec![inbound(obs[0], "0xcc", VoteType::Success)];
    let outcome = machine.apply_block(&mut state, 10, &calls).await.unwrap();
    assert_eq!(outcome.applied(), 1);

    let quiet = machine.apply_block(&mut state, 110, &[]).await.unwrap();
    assert!(quiet.end_block_events.is_empty());

    let stuck = machine.apply_block(&mut state, 111, &[]).await.unwrap();
    assert!(stuck.end_block_events.contains(&ObserverEvent::StuckNonceDetected {
        chain_id: BSC,
        nonce_low: 0,
    }));
}

#[tokio::test]
async fn fatal_error_aborts_the_block() {
    let (machine, mut state, obs) = setup(1);
    // A blame already sitting at the index the failed ballot will use.
    let index = inbound_ballot_index(ETH, BSC, "0xdd", 0);
    let mut blame = sample::blame_record("pre");
    blame.index = ballot_blame_index(&index);
    state.put_typed(&blame_key(&blame.index), &blame).unwrap();

    let calls = vec![
        inbound(obs[0], "0xee", VoteType::Success),
        inbound(obs[0], "0xdd", VoteType::Failure),
        inbound(obs[0], "0xff", VoteType::Success),
    ];
    let err = machine.apply_block(&mut state, 50, &calls).await.unwrap_err();
    match &err {
        ExecutionError::FatalTransition { service_id, method, source } => {
            assert_eq!(service_id, "crosschain");
            assert_eq!(method, "vote_inbound@v1");
            assert!(source.is_fatal());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), "TX_INVARIANT_VIOLATION");

    // The input before the fatal one stays committed; nothing after it ran.
    let pending = NonceAllocator::pending_nonces(&state, BSC).unwrap().unwrap();
    assert_eq!(pending.nonce_high, 1);
    assert!(xco_services::BallotBox::get_ballot(&state, &index).unwrap().is_none());
}
