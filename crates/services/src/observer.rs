// Path: crates/services/src/observer.rs
//! The governance-managed observer set and crosschain flags.

use parity_scale_codec::{Decode, Encode};
use xco_api::state::{StateAccess, StateAccessExt};
use xco_api::transaction::context::TxContext;
use xco_macros::service_interface;
use xco_types::app::{
    AccountId, CrosschainFlags, LastObserverCount, NodeAccount, NodeStatus, ObserverEvent,
    ObserverSet,
};
use xco_types::error::{ObserverError, TransactionError};
use xco_types::keys::{
    node_account_key, CROSSCHAIN_FLAGS_KEY, LAST_OBSERVER_COUNT_KEY, OBSERVER_SET_KEY,
};

// --- Service Method Parameter Structs (The Service's Public ABI) ---

#[derive(Encode, Decode, Debug, Clone)]
pub struct AddObserverParams {
    pub node_account: NodeAccount,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct RemoveObserverParams {
    pub operator: AccountId,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct UpdateObserverParams {
    pub old_operator: AccountId,
    pub node_account: NodeAccount,
}

#[derive(Encode, Decode, Debug, Clone)]
pub struct SetCrosschainFlagsParams {
    pub flags: CrosschainFlags,
}

/// Owns the observer set, node accounts and crosschain flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObserverRegistry;

impl ObserverRegistry {
    /// The current observer set. Empty at version 0 before any observer is added.
    pub fn observer_set(state: &dyn StateAccess) -> Result<ObserverSet, TransactionError> {
        Ok(state.get_typed(OBSERVER_SET_KEY)?.unwrap_or_default())
    }

    /// True if `account` is in the observer set.
    pub fn is_observer(state: &dyn StateAccess, account: &AccountId) -> Result<bool, TransactionError> {
        Ok(Self::observer_set(state)?.contains(account))
    }

    /// The node account of `operator`.
    pub fn node_account(
        state: &dyn StateAccess,
        operator: &AccountId,
    ) -> Result<Option<NodeAccount>, TransactionError> {
        Ok(state.get_typed(&node_account_key(operator))?)
    }

    pub fn last_observer_count(
        state: &dyn StateAccess,
    ) -> Result<Option<LastObserverCount>, TransactionError> {
        Ok(state.get_typed(LAST_OBSERVER_COUNT_KEY)?)
    }

    /// The crosschain flags. Both directions are enabled until governance says otherwise.
    pub fn crosschain_flags(state: &dyn StateAccess) -> Result<CrosschainFlags, TransactionError> {
        Ok(state.get_typed(CROSSCHAIN_FLAGS_KEY)?.unwrap_or_default())
    }

    /// Resolves `account` to an active observer's node account.
    pub fn require_active_observer(
        state: &dyn StateAccess,
        account: &AccountId,
    ) -> Result<NodeAccount, TransactionError> {
        if !Self::is_observer(state, account)? {
            return Err(ObserverError::NotAnObserver(*account).into());
        }
        let node = Self::node_account(state, account)?
            .ok_or(ObserverError::NotAnObserver(*account))?;
        if node.node_status != NodeStatus::Active {
            return Err(ObserverError::ObserverInactive(*account).into());
        }
        Ok(node)
    }

    /// Writes the set with a bumped version and refreshes the last observer count.
    pub(crate) fn write_observer_set(
        state: &mut dyn StateAccess,
        mut set: ObserverSet,
        height: u64,
    ) -> Result<ObserverSet, TransactionError> {
        set.version = set.version.saturating_add(1);
        set.last_change_height = height;
        state.put_typed(OBSERVER_SET_KEY, &set)?;
        state.put_typed(
            LAST_OBSERVER_COUNT_KEY,
            &LastObserverCount {
                count: set.len() as u64,
                last_change_height: height,
            },
        )?;
        Ok(set)
    }

    fn commit_set_change(
        state: &mut dyn StateAccess,
        ctx: &mut TxContext<'_>,
        set: ObserverSet,
    ) -> Result<(), TransactionError> {
        let set = Self::write_observer_set(state, set, ctx.block_height)?;
        tracing::info!(
            target: "observer",
            event = "set_changed",
            version = set.version,
            count = set.len(),
            height = ctx.block_height,
        );
        ctx.emit(ObserverEvent::ObserverSetChanged {
            version: set.version,
            count: set.len() as u64,
        });
        Ok(())
    }
}

#[service_interface(id = "observer", abi_version = 1, state_schema = "v1")]
impl ObserverRegistry {
    #[method(governance)]
    pub fn add_observer(
        &self,
        state: &mut dyn StateAccess,
        params: AddObserverParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let node = params.node_account;
        let mut set = Self::observer_set(state)?;
        if set.contains(&node.operator) {
            return Err(ObserverError::ObserverAlreadyExists(node.operator).into());
        }
        set.observers.push(node.operator);
        state.put_typed(&node_account_key(&node.operator), &node)?;
        Self::commit_set_change(state, ctx, set)
    }

    #[method(governance)]
    pub fn remove_observer(
        &self,
        state: &mut dyn StateAccess,
        params: RemoveObserverParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let mut set = Self::observer_set(state)?;
        if !set.contains(&params.operator) {
            return Err(ObserverError::NotAnObserver(params.operator).into());
        }
        set.observers.retain(|o| o != &params.operator);
        state.delete(&node_account_key(&params.operator))?;
        Self::commit_set_change(state, ctx, set)
    }

    /// Replaces an observer in place, keeping its position in the set.
    #[method(governance)]
    pub fn update_observer(
        &self,
        state: &mut dyn StateAccess,
        params: UpdateObserverParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let new_operator = params.node_account.operator;
        let mut set = Self::observer_set(state)?;
        let pos = set
            .observers
            .iter()
            .position(|o| o == &params.old_operator)
            .ok_or(ObserverError::NotAnObserver(params.old_operator))?;
        if new_operator != params.old_operator && set.contains(&new_operator) {
            return Err(ObserverError::ObserverAlreadyExists(new_operator).into());
        }
        if let Some(slot) = set.observers.get_mut(pos) {
            *slot = new_operator;
        }
        state.delete(&node_account_key(&params.old_operator))?;
        state.put_typed(&node_account_key(&new_operator), &params.node_account)?;
        Self::commit_set_change(state, ctx, set)
    }

    #[method(governance)]
    pub fn set_crosschain_flags(
        &self,
        state: &mut dyn StateAccess,
        params: SetCrosschainFlagsParams,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        state.put_typed(CROSSCHAIN_FLAGS_KEY, &params.flags)?;
        tracing::info!(
            target: "observer",
            event = "flags_set",
            inbound = params.flags.is_inbound_enabled,
            outbound = params.flags.is_outbound_enabled,
            height = ctx.block_height,
        );
        Ok(())
    }
}
