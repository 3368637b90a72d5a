// Path: crates/services/tests/common/mod.rs
#![allow(dead_code)]

use parity_scale_codec::Encode;
use std::sync::Arc;
use xco_api::lifecycle::OnEndBlock;
use xco_api::services::access::ServiceDirectory;
use xco_api::services::BlockchainService;
use xco_api::state::{MemoryState, StateAccess, StateOverlay};
use xco_api::transaction::context::TxContext;
use xco_services::genesis::init_genesis;
use xco_services::{
    ChainParamsRegistry, CrosschainVoting, NonceAllocator, ObserverRegistry, TssKeygen,
};
use xco_test_utils::sample;
use xco_types::app::{AccountId, ChainId, ObserverEvent};
use xco_types::config::{CoreConfig, GenesisState};
use xco_types::error::TransactionError;
use xco_types::service_configs::{GovernancePolicy, GovernanceSigner};

pub const LOCAL_CHAIN: ChainId = ChainId(7000);
pub const ETH: ChainId = ChainId(1);
pub const BSC: ChainId = ChainId(56);
pub const UNSUPPORTED: ChainId = ChainId(8332);

pub fn governor() -> AccountId {
    sample::account(200)
}

pub fn outsider() -> AccountId {
    sample::account(250)
}

/// A committed store plus the registered services, applying each call under
/// its own overlay the way the execution layer does.
pub struct Harness {
    pub state: MemoryState,
    pub services: ServiceDirectory,
    pub observers: Vec<AccountId>,
    pub height: u64,
}

impl Harness {
    pub fn new(observer_count: u8) -> Self {
        Self::with_config(observer_count, CoreConfig {
            local_chain_id: LOCAL_CHAIN,
            ..Default::default()
        })
    }

    pub fn with_config(observer_count: u8, config: CoreConfig) -> Self {
        let observers = sample::observers(observer_count);
        let genesis = GenesisState {
            governance: Some(GovernancePolicy {
                signer: GovernanceSigner::Single(governor()),
            }),
            node_accounts: observers.iter().map(|o| sample::node_account(*o)).collect(),
            chain_params: vec![
                sample::chain_params_supported(ETH.0),
                sample::chain_params_supported(BSC.0),
                sample::chain_params(UNSUPPORTED.0),
            ],
            tss: Some(sample::tss("genesis")),
            ..Default::default()
        };
        let mut state = MemoryState::new();
        init_genesis(&mut state, &genesis).unwrap();

        let services: Vec<Arc<dyn BlockchainService>> = vec![
            Arc::new(ObserverRegistry),
            Arc::new(ChainParamsRegistry),
            Arc::new(NonceAllocator::new(config.nonce.clone())),
            Arc::new(TssKeygen),
            Arc::new(CrosschainVoting::new(config)),
        ];
        Self {
            state,
            services: ServiceDirectory::new(services),
            observers,
            height: 1_100,
        }
    }

    pub fn observer(&self, i: usize) -> AccountId {
        self.observers[i]
    }

    pub fn allocator(&self) -> Arc<NonceAllocator> {
        self.services.get::<NonceAllocator>().unwrap()
    }

    pub fn keygen_machine(&self) -> Arc<TssKeygen> {
        self.services.get::<TssKeygen>().unwrap()
    }

    /// Dispatches `service_id.method` with SCALE-encoded `params`.
    pub async fn call<P: Encode>(
        &mut self,
        service_id: &str,
        method: &str,
        params: &P,
        signer: AccountId,
    ) -> Result<Vec<ObserverEvent>, TransactionError> {
        let service = self.services.get_by_id(service_id).unwrap().clone();
        let mut overlay = StateOverlay::new(&self.state);
        let mut ctx = TxContext::new(self.height, LOCAL_CHAIN, signer, &self.services);
        service
            .handle_service_call(&mut overlay, method, &params.encode(), &mut ctx)
            .await?;
        let events = ctx.take_events();
        let (inserts, deletes) = overlay.into_ordered_batch();
        self.state.batch_apply(&inserts, &deletes).unwrap();
        Ok(events)
    }

    /// Runs `f` as one input signed by `signer`, committing only on success.
    pub fn apply<R>(
        &mut self,
        signer: AccountId,
        f: impl FnOnce(&mut dyn StateAccess, &mut TxContext<'_>) -> Result<R, TransactionError>,
    ) -> Result<R, TransactionError> {
        let mut overlay = StateOverlay::new(&self.state);
        let mut ctx = TxContext::new(self.height, LOCAL_CHAIN, signer, &self.services);
        let state: &mut dyn StateAccess = &mut overlay;
        let out = f(state, &mut ctx)?;
        let (inserts, deletes) = overlay.into_ordered_batch();
        self.state.batch_apply(&inserts, &deletes).unwrap();
        Ok(out)
    }

    /// Runs the nonce allocator's end-block hook at the current height.
    pub async fn end_block(&mut self) -> Result<Vec<ObserverEvent>, TransactionError> {
        let allocator = self.allocator();
        let mut overlay = StateOverlay::new(&self.state);
        let mut ctx = TxContext::internal(self.height, LOCAL_CHAIN, &self.services);
        allocator.on_end_block(&mut overlay, &mut ctx).await?;
        let events = ctx.take_events();
        let (inserts, deletes) = overlay.into_ordered_batch();
        self.state.batch_apply(&inserts, &deletes).unwrap();
        Ok(events)
    }
}
