// Path: crates/execution/src/app/end_block.rs
//! Logic that runs once every input of a block has been applied.

use crate::error::ExecutionError;
use xco_api::services::access::ServiceDirectory;
use xco_api::state::StateAccess;
use xco_api::transaction::context::TxContext;
use xco_types::service_configs::Capabilities;

/// Runs the `on_end_block` hook of every service that declares the capability,
/// in service-id order.
pub(super) async fn run_on_end_block_hooks(
    services: &ServiceDirectory,
    state: &mut dyn StateAccess,
    ctx: &mut TxContext<'_>,
) -> Result<usize, ExecutionError> {
    let mut ran = 0;
    for service in services.services_in_deterministic_order() {
        if !service.capabilities().contains(Capabilities::ON_END_BLOCK) {
            continue;
        }
        let Some(hook) = service.as_on_end_block() else {
            tracing::warn!(
                target: "end_block",
                service = service.id(),
                "Service declares ON_END_BLOCK but exposes no hook."
            );
            continue;
        };
        if let Err(source) = hook.on_end_block(state, ctx).await {
            tracing::error!(
                target: "end_block",
                event = "hook_failed",
                service = service.id(),
                height = ctx.block_height,
                error = %source,
            );
            return Err(ExecutionError::EndBlock {
                service_id: service.id().to_string(),
                source,
            });
        }
        ran += 1;
    }
    Ok(ran)
}
