// Path: crates/api/src/lifecycle/mod.rs
//! Defines traits for services that hook into the block processing lifecycle.

use crate::services::BlockchainService;
use crate::state::StateAccess;
use crate::transaction::context::TxContext;
use async_trait::async_trait;
use xco_types::error::TransactionError;

/// A trait for services that need to perform actions at the end of a block.
///
/// Hooks run with `ctx.is_internal == true`. This is where height-based
/// conditions such as stuck nonces are detected.
#[async_trait]
pub trait OnEndBlock: BlockchainService {
    /// Called after all inputs of a block have been applied.
    async fn on_end_block(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
    ) -> Result<(), TransactionError>;
}
