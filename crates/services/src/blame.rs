// Path: crates/services/src/blame.rs
//! Append-only record of nodes blamed for failed ceremonies and ballots.

use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_types::app::{keysign_blame_prefix, Blame, BlameNode, ChainId, ObserverEvent};
use xco_types::error::TransactionError;
use xco_types::keys::{blame_key, BLAME_PREFIX};

/// Writes and reads blame records.
///
/// A blame index is written at most once. Recording an index twice means two
/// code paths disagree about which failure happened, so it is reported as a
/// fatal invariant violation rather than a user error.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlameRecorder;

impl BlameRecorder {
    /// Appends a blame record under `index`.
    pub fn record(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        index: String,
        failure_reason: String,
        nodes: Vec<BlameNode>,
    ) -> Result<(), TransactionError> {
        let key = blame_key(&index);
        if state.get(&key)?.is_some() {
            tracing::error!(
                target: "blame",
                event = "duplicate",
                index = %index,
                "Blame index recorded twice"
            );
            return Err(TransactionError::InvariantViolation(format!(
                "blame {index} already recorded"
            )));
        }
        let blame = Blame {
            index: index.clone(),
            failure_reason,
            nodes,
        };
        state.put_typed(&key, &blame)?;

        let kind = index.split('-').next().unwrap_or("unknown");
        xco_telemetry::observer_metrics().inc_blame_recorded(kind);
        tracing::info!(
            target: "blame",
            event = "recorded",
            index = %index,
            nodes = blame.nodes.len(),
            reason = %blame.failure_reason,
        );
        ctx.emit(ObserverEvent::BlameRecorded { index });
        Ok(())
    }

    /// The blame record under `index`, if any.
    pub fn get(state: &dyn StateAccess, index: &str) -> Result<Option<Blame>, TransactionError> {
        Ok(state.get_typed(&blame_key(index))?)
    }

    /// True if a record exists under `index`.
    pub fn exists(state: &dyn StateAccess, index: &str) -> Result<bool, TransactionError> {
        Ok(state.get(&blame_key(index))?.is_some())
    }

    /// Every blame record, ordered by index.
    pub fn list(state: &dyn StateAccess) -> Result<Vec<Blame>, TransactionError> {
        Ok(state
            .scan_typed::<Blame>(BLAME_PREFIX)?
            .into_iter()
            .map(|(_, b)| b)
            .collect())
    }

    /// Keysign blame records for one nonce of one chain.
    pub fn by_chain_nonce(
        state: &dyn StateAccess,
        chain_id: ChainId,
        nonce: u64,
    ) -> Result<Vec<Blame>, TransactionError> {
        let prefix = blame_key(&keysign_blame_prefix(chain_id, nonce));
        Ok(state
            .scan_typed::<Blame>(&prefix)?
            .into_iter()
            .map(|(_, b)| b)
            .collect())
    }
}
