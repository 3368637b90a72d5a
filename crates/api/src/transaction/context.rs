// Path: crates/api/src/transaction/context.rs
//! Defines the stable context for one state transition.

use crate::services::access::ServiceDirectory;
use xco_types::app::{AccountId, ChainId, ObserverEvent};

/// Context handed to services while one input is applied.
pub struct TxContext<'a> {
    /// The current block height.
    pub block_height: u64,
    /// The chain this core runs on.
    pub chain_id: ChainId,
    /// The account that signed the input. Authoritative for permission checks.
    pub signer_account_id: AccountId,
    /// The registered services.
    pub services: &'a ServiceDirectory,
    /// True while simulating; writes are discarded by the host.
    pub simulation: bool,
    /// True when the chain itself initiated the call (end-block hooks).
    pub is_internal: bool,
    events: Vec<ObserverEvent>,
}

impl<'a> TxContext<'a> {
    /// A context for a user-signed input.
    pub fn new(
        block_height: u64,
        chain_id: ChainId,
        signer_account_id: AccountId,
        services: &'a ServiceDirectory,
    ) -> Self {
        Self {
            block_height,
            chain_id,
            signer_account_id,
            services,
            simulation: false,
            is_internal: false,
            events: Vec::new(),
        }
    }

    /// A context for a chain-initiated call.
    pub fn internal(block_height: u64, chain_id: ChainId, services: &'a ServiceDirectory) -> Self {
        Self {
            is_internal: true,
            ..Self::new(block_height, chain_id, AccountId::default(), services)
        }
    }

    /// Records an event. Events are only published if the transition commits.
    pub fn emit(&mut self, event: ObserverEvent) {
        self.events.push(event);
    }

    /// Events emitted so far.
    pub fn events(&self) -> &[ObserverEvent] {
        &self.events
    }

    /// Takes the emitted events, leaving the list empty.
    pub fn take_events(&mut self) -> Vec<ObserverEvent> {
        std::mem::take(&mut self.events)
    }
}
