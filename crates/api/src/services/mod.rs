// Path: crates/api/src/services/mod.rs
//! Traits for dispatchable observer services.

use crate::lifecycle::OnEndBlock;
use crate::state::StateAccess;
use crate::transaction::context::TxContext;
use async_trait::async_trait;
use std::any::Any;
use xco_types::error::TransactionError;
use xco_types::service_configs::Capabilities;

pub mod access;

/// The base trait for any service managed by the observer core.
///
/// Every mutating operation reaches a service through
/// [`BlockchainService::handle_service_call`] with a `StateAccess` that is a
/// transition-scoped overlay. A returned error discards every write the call
/// made, so services may write eagerly and fail late.
#[async_trait]
pub trait BlockchainService: Any + Send + Sync {
    /// A unique, static, lowercase identifier. Used for dispatch and for
    /// deterministic ordering of lifecycle hooks.
    fn id(&self) -> &str;

    /// The version of the ABI the service expects from the host.
    fn abi_version(&self) -> u32;

    /// A string identifying the schema of the state this service reads/writes.
    fn state_schema(&self) -> &str;

    /// Returns a bitmask of the lifecycle capabilities (hooks) this service implements.
    fn capabilities(&self) -> Capabilities;

    /// Provides access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Handles a dispatched call. `method` is versioned, e.g. `"vote_inbound@v1"`,
    /// and `params` is the canonical encoding of the method's parameter struct.
    async fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext<'_>,
    ) -> Result<(), TransactionError> {
        let _ = (state, params, ctx);
        Err(TransactionError::Unsupported(format!(
            "Service '{}' does not support method '{}'",
            self.id(),
            method
        )))
    }

    /// Attempts to downcast this service to an `OnEndBlock` trait object.
    fn as_on_end_block(&self) -> Option<&dyn OnEndBlock> {
        None
    }
}
