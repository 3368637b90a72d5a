// Path: crates/services/tests/genesis.rs
use xco_api::state::MemoryState;
use xco_services::genesis::{export_genesis, init_genesis};
use xco_services::{BallotBox, ObserverRegistry, TssKeygen};
use xco_test_utils::{assert_err_code, assert_ok, sample};
use xco_types::app::{ChainId, PendingNonces};
use xco_types::config::GenesisState;
use xco_types::service_configs::{GovernancePolicy, GovernanceSigner};

fn full_genesis() -> GenesisState {
    let observers = sample::observers(4);
    let mut ballot = sample::ballot("ballot-a");
    ballot.creation_height = 7;
    let pending_nonces = sample::pending_nonces_list("tss-a", 3);
    let mut chain_nonces = sample::chain_nonces_list(3);
    for (next, pending) in chain_nonces.iter_mut().zip(&pending_nonces) {
        next.nonce = pending.nonce_high;
    }
    GenesisState {
        governance: Some(GovernancePolicy {
            signer: GovernanceSigner::AnyOf(vec![sample::account(200), sample::account(201)]),
        }),
        node_accounts: observers.iter().map(|o| sample::node_account(*o)).collect(),
        crosschain_flags: Some(sample::crosschain_flags()),
        chain_params: vec![sample::chain_params_supported(1), sample::chain_params(2)],
        chain_nonces,
        pending_nonces,
        nonce_to_cctx: sample::nonce_to_cctx_list(1, "tss-a", 5),
        tss: Some(sample::tss("current")),
        tss_history: sample::tss_list(3),
        keygen: Some(sample::keygen("keygen")),
        tss_fund_migrators: vec![sample::tss_fund_migrator(1), sample::tss_fund_migrator(2)],
        ballots: vec![ballot, sample::ballot("ballot-b")],
        blame: sample::blame_records_list(4),
    }
}

#[test]
fn export_reimports_to_the_same_state() {
    let genesis = full_genesis();
    let mut state = MemoryState::new();
    assert_ok!(init_genesis(&mut state, &genesis));
    let exported = assert_ok!(export_genesis(&state));

    assert_eq!(exported.governance, genesis.governance);
    assert_eq!(exported.node_accounts, genesis.node_accounts);
    assert_eq!(exported.crosschain_flags, genesis.crosschain_flags);
    assert_eq!(exported.chain_params.len(), 2);
    assert_eq!(exported.chain_nonces.len(), 3);
    assert_eq!(exported.pending_nonces.len(), 3);
    assert_eq!(exported.nonce_to_cctx, genesis.nonce_to_cctx);
    assert_eq!(exported.tss, genesis.tss);
    assert_eq!(exported.tss_history, genesis.tss_history);
    assert_eq!(exported.keygen, genesis.keygen);
    assert_eq!(exported.tss_fund_migrators, genesis.tss_fund_migrators);
    assert_eq!(exported.ballots.len(), 2);
    assert_eq!(exported.blame.len(), 4);

    let mut copy = MemoryState::new();
    assert_ok!(init_genesis(&mut copy, &exported));
    assert_eq!(assert_ok!(export_genesis(&copy)), exported);
}

#[test]
fn import_builds_derived_tables() {
    let genesis = full_genesis();
    let mut state = MemoryState::new();
    init_genesis(&mut state, &genesis).unwrap();

    let set = ObserverRegistry::observer_set(&state).unwrap();
    assert_eq!((set.version, set.len()), (1, 4));
    assert_eq!(ObserverRegistry::last_observer_count(&state).unwrap().unwrap().count, 4);

    let at_seven = BallotBox::ballots_at_height(&state, 7).unwrap();
    assert_eq!(at_seven.len(), 1);
    assert_eq!(at_seven[0].index, "ballot-a");
    assert_eq!(BallotBox::ballots_created_at_or_before(&state, 42).unwrap().len(), 2);

    let history = TssKeygen::tss_history(&state).unwrap();
    assert!(history.windows(2).all(|w| w[0].finalized_height <= w[1].finalized_height));
}

#[test]
fn empty_genesis_exports_defaults() {
    let state = MemoryState::new();
    let exported = export_genesis(&state).unwrap();
    assert_eq!(exported, GenesisState::default());
    assert_eq!(ObserverRegistry::observer_set(&state).unwrap().version, 0);
    assert!(ObserverRegistry::crosschain_flags(&state).unwrap().is_inbound_enabled);
}

#[test]
fn malformed_genesis_is_rejected() {
    let mut dup = full_genesis();
    let first = dup.node_accounts[0].clone();
    dup.node_accounts.push(first);
    assert_err_code!(init_genesis(&mut MemoryState::new(), &dup), "OBSERVER_ALREADY_EXISTS");

    let mut inverted = full_genesis();
    inverted.pending_nonces = vec![PendingNonces {
        chain_id: ChainId(1),
        nonce_low: 9,
        nonce_high: 3,
        tss: "tss-a".into(),
        held: vec![],
        last_advance_height: 0,
    }];
    assert_err_code!(init_genesis(&mut MemoryState::new(), &inverted), "TX_INVALID");

    let mut orphan_range = full_genesis();
    orphan_range.chain_nonces.remove(0);
    assert_err_code!(init_genesis(&mut MemoryState::new(), &orphan_range), "TX_INVALID");

    let mut behind = full_genesis();
    behind.chain_nonces[1].nonce += 1;
    assert_err_code!(init_genesis(&mut MemoryState::new(), &behind), "TX_INVALID");

    let mut twice_blamed = full_genesis();
    let blame = twice_blamed.blame[2].clone();
    twice_blamed.blame.push(blame);
    assert_err_code!(init_genesis(&mut MemoryState::new(), &twice_blamed), "TX_INVALID");

    let mut short_votes = full_genesis();
    short_votes.ballots[0].votes.pop();
    assert_err_code!(init_genesis(&mut MemoryState::new(), &short_votes), "TX_INVALID");

    let mut short_weights = full_genesis();
    short_weights.ballots[1].weights = vec![3];
    assert_err_code!(init_genesis(&mut MemoryState::new(), &short_weights), "TX_INVALID");

    let mut bad_params = full_genesis();
    bad_params.chain_params[0].in_tx_ticker = 0;
    assert_err_code!(
        init_genesis(&mut MemoryState::new(), &bad_params),
        "GOVERNANCE_INVALID_CHAIN_PARAMS"
    );
}

#[test]
fn history_keeps_keys_retired_at_the_same_height() {
    let mut genesis = GenesisState::default();
    let mut first = sample::tss("first");
    let mut second = sample::tss("second");
    first.finalized_height = 500;
    second.finalized_height = 500;
    genesis.tss_history = vec![first, second];

    let mut state = MemoryState::new();
    assert_ok!(init_genesis(&mut state, &genesis));
    assert_eq!(TssKeygen::tss_history(&state).unwrap(), genesis.tss_history);
}
