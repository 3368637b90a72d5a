// Path: crates/services/tests/governance.rs
mod common;

use common::{governor, outsider, Harness, BSC, ETH, UNSUPPORTED};
use xco_services::chain_params::{RemoveChainParamsParams, UpdateChainParamsParams};
use xco_services::observer::{AddObserverParams, RemoveObserverParams, UpdateObserverParams};
use xco_services::tss::{AddTssFundMigratorParams, StartKeygenParams};
use xco_services::{ChainParamsRegistry, CrosschainVoting, NonceAllocator, ObserverRegistry, TssKeygen};
use xco_test_utils::{assert_err_code, assert_ok, sample};
use xco_types::app::{KeygenStatus, ObserverEvent};
use xco_types::service_configs::MethodPermission;

#[tokio::test]
async fn observer_changes_require_governance() {
    let mut h = Harness::new(2);
    let newcomer = sample::account(42);
    let add = AddObserverParams {
        node_account: sample::node_account(newcomer),
    };

    assert_err_code!(
        h.call("observer", "add_observer@v1", &add, outsider()).await,
        "GOVERNANCE_UNAUTHORIZED"
    );
    assert_err_code!(
        h.call("observer", "add_observer@v1", &add, h.observer(0)).await,
        "GOVERNANCE_UNAUTHORIZED"
    );
    assert!(!ObserverRegistry::is_observer(&h.state, &newcomer).unwrap());

    h.height = 1_200;
    let events = assert_ok!(h.call("observer", "add_observer@v1", &add, governor()).await);
    assert_eq!(events, vec![ObserverEvent::ObserverSetChanged { version: 2, count: 3 }]);
    let set = ObserverRegistry::observer_set(&h.state).unwrap();
    assert_eq!(set.observers.last(), Some(&newcomer));
    assert_eq!(set.last_change_height, 1_200);
    let count = ObserverRegistry::last_observer_count(&h.state).unwrap().unwrap();
    assert_eq!((count.count, count.last_change_height), (3, 1_200));

    assert_err_code!(
        h.call("observer", "add_observer@v1", &add, governor()).await,
        "OBSERVER_ALREADY_EXISTS"
    );
}

#[tokio::test]
async fn update_keeps_position_and_remove_drops_node_account() {
    let mut h = Harness::new(3);
    let (first, second) = (h.observer(0), h.observer(1));
    let replacement = sample::account(77);

    let update = UpdateObserverParams {
        old_operator: second,
        node_account: sample::node_account(replacement),
    };
    assert_ok!(h.call("observer", "update_observer@v1", &update, governor()).await);
    let set = ObserverRegistry::observer_set(&h.state).unwrap();
    assert_eq!(set.observers.get(1), Some(&replacement));
    assert!(ObserverRegistry::node_account(&h.state, &second).unwrap().is_none());

    // Renaming onto an existing member is refused.
    let clash = UpdateObserverParams {
        old_operator: replacement,
        node_account: sample::node_account(first),
    };
    assert_err_code!(
        h.call("observer", "update_observer@v1", &clash, governor()).await,
        "OBSERVER_ALREADY_EXISTS"
    );

    let remove = RemoveObserverParams { operator: first };
    assert_ok!(h.call("observer", "remove_observer@v1", &remove, governor()).await);
    assert!(!ObserverRegistry::is_observer(&h.state, &first).unwrap());
    assert!(ObserverRegistry::node_account(&h.state, &first).unwrap().is_none());
    assert_err_code!(
        h.call("observer", "remove_observer@v1", &remove, governor()).await,
        "OBSERVER_NOT_AN_OBSERVER"
    );
    assert_err_code!(
        ObserverRegistry::require_active_observer(&h.state, &first),
        "OBSERVER_NOT_AN_OBSERVER"
    );

    let set = ObserverRegistry::observer_set(&h.state).unwrap();
    assert_eq!(set.version, 3);
    assert_eq!(set.len(), 2);
}

#[tokio::test]
async fn chain_params_are_validated_and_removable() {
    let mut h = Harness::new(1);
    let mut params = sample::chain_params_supported(UNSUPPORTED.0);
    params.confirmation_count = 0;
    let update = UpdateChainParamsParams { params };
    assert_err_code!(
        h.call("chain_params", "update_chain_params@v1", &update, governor()).await,
        "GOVERNANCE_INVALID_CHAIN_PARAMS"
    );
    assert!(!ChainParamsRegistry::get_params(&h.state, UNSUPPORTED).unwrap().unwrap().is_supported);

    let update = UpdateChainParamsParams {
        params: sample::chain_params_supported(UNSUPPORTED.0),
    };
    assert_ok!(h.call("chain_params", "update_chain_params@v1", &update, governor()).await);
    let mut supported: Vec<_> = ChainParamsRegistry::supported_chains(&h.state)
        .unwrap()
        .into_iter()
        .map(|p| p.chain_id)
        .collect();
    supported.sort();
    assert_eq!(supported, vec![ETH, BSC, UNSUPPORTED]);

    let remove = RemoveChainParamsParams { chain_id: ETH };
    assert_err_code!(
        h.call("chain_params", "remove_chain_params@v1", &remove, outsider()).await,
        "GOVERNANCE_UNAUTHORIZED"
    );
    assert_ok!(h.call("chain_params", "remove_chain_params@v1", &remove, governor()).await);
    assert!(ChainParamsRegistry::get_params(&h.state, ETH).unwrap().is_none());
    assert_err_code!(
        h.call("chain_params", "remove_chain_params@v1", &remove, governor()).await,
        "GOVERNANCE_INVALID_CHAIN_PARAMS"
    );
}

#[tokio::test]
async fn keygen_cannot_restart_while_pending() {
    let mut h = Harness::new(1);
    let start = StartKeygenParams {
        grantee_pubkeys: vec!["pk-0".into()],
        block_number: 1_500,
    };
    assert_err_code!(
        h.call("tss", "start_keygen@v1", &start, h.observer(0)).await,
        "GOVERNANCE_UNAUTHORIZED"
    );
    assert_ok!(h.call("tss", "start_keygen@v1", &start, governor()).await);
    let keygen = TssKeygen::pending_keygen(&h.state).unwrap();
    assert_eq!((keygen.status, keygen.attempt, keygen.block_number), (KeygenStatus::Pending, 1, 1_500));

    assert_err_code!(
        h.call("tss", "start_keygen@v1", &start, governor()).await,
        "TSS_KEYGEN_ALREADY_PENDING"
    );
}

#[tokio::test]
async fn fund_migrator_is_write_once() {
    let mut h = Harness::new(1);
    let add = AddTssFundMigratorParams {
        chain_id: BSC,
        migration_cctx_index: "migrate-bsc".into(),
    };
    assert_ok!(h.call("tss", "add_tss_fund_migrator@v1", &add, governor()).await);
    let again = AddTssFundMigratorParams {
        chain_id: BSC,
        migration_cctx_index: "other".into(),
    };
    assert_err_code!(
        h.call("tss", "add_tss_fund_migrator@v1", &again, governor()).await,
        "TSS_FUND_MIGRATOR_EXISTS"
    );
    let info = TssKeygen::fund_migrator(&h.state, BSC).unwrap().unwrap();
    assert_eq!(info.migration_cctx_index, "migrate-bsc");
}

#[test]
fn method_tables_declare_permissions() {
    for (_, permission) in ObserverRegistry::METHODS
        .iter()
        .chain(ChainParamsRegistry::METHODS)
        .chain(NonceAllocator::METHODS)
        .chain(TssKeygen::METHODS)
    {
        assert_eq!(*permission, MethodPermission::Governance);
    }
    assert_eq!(CrosschainVoting::METHODS.len(), 4);
    assert!(CrosschainVoting::METHODS
        .iter()
        .all(|(_, p)| *p == MethodPermission::User));
    assert!(CrosschainVoting::METHODS
        .iter()
        .any(|(name, _)| *name == "vote_inbound@v1"));
}
