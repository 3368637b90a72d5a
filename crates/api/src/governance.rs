// Path: crates/api/src/governance.rs
//! Permission checks applied before gated service methods run.

use crate::state::{StateAccess, StateAccessExt};
use crate::transaction::context::TxContext;
use xco_types::error::{GovernanceError, TransactionError};
use xco_types::keys::GOVERNANCE_KEY;
use xco_types::service_configs::GovernancePolicy;

/// Fails unless the signer is authorized by the stored governance policy.
pub fn require_governance(
    state: &dyn StateAccess,
    ctx: &TxContext<'_>,
) -> Result<(), TransactionError> {
    let policy: GovernancePolicy = state
        .get_typed(GOVERNANCE_KEY)?
        .ok_or(GovernanceError::PolicyNotFound)?;
    if !policy.authorizes(&ctx.signer_account_id) {
        tracing::warn!(
            target: "governance",
            signer = %ctx.signer_account_id,
            "Rejected governance call from unauthorized signer"
        );
        return Err(GovernanceError::Unauthorized(ctx.signer_account_id).into());
    }
    Ok(())
}

/// Fails unless the call was initiated by the chain itself.
pub fn require_internal(ctx: &TxContext<'_>, method: &str) -> Result<(), TransactionError> {
    if ctx.is_internal {
        Ok(())
    } else {
        Err(GovernanceError::InternalOnly(method.to_string()).into())
    }
}
