// Path: crates/types/src/service_configs/mod.rs
//! Service capability flags, method permissions and the governance policy.

use crate::app::AccountId;
use bitflags::bitflags;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Lifecycle hooks a service implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Implements the `OnEndBlock` trait and its `on_end_block` hook.
        const ON_END_BLOCK = 0b0001;
    }
}

impl Encode for Capabilities {
    fn encode_to<T: parity_scale_codec::Output + ?Sized>(&self, dest: &mut T) {
        self.bits().encode_to(dest)
    }
}

impl Decode for Capabilities {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        let bits = u32::decode(input)?;
        Self::from_bits(bits).ok_or_else(|| "Invalid bits for Capabilities".into())
    }
}

/// The permission level required to call a service method.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodPermission {
    /// Callable by any signer. Services check observer membership themselves.
    User,
    /// Callable only by the governance authority.
    Governance,
    /// Callable only by the chain itself.
    Internal,
}

/// The on-chain authority for governance-gated actions.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub enum GovernanceSigner {
    /// A single account is the governor.
    Single(AccountId),
    /// Any one of a fixed list of accounts may act.
    AnyOf(Vec<AccountId>),
}

/// The policy object stored on-chain defining the governance authority.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq, Eq)]
pub struct GovernancePolicy {
    /// The authority responsible for governance actions.
    pub signer: GovernanceSigner,
}

impl GovernancePolicy {
    /// True if `account` may perform governance actions.
    pub fn authorizes(&self, account: &AccountId) -> bool {
        match &self.signer {
            GovernanceSigner::Single(a) => a == account,
            GovernanceSigner::AnyOf(list) => list.contains(account),
        }
    }
}
