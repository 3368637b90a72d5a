// Path: crates/types/src/app/identity.rs
//! Identity primitives for chains and accounts.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an external (or the local) chain.
#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct ChainId(pub i64);

impl ChainId {
    /// Big-endian, sign-flipped bytes so that keys sort in numeric order.
    pub fn to_key_bytes(self) -> [u8; 8] {
        ((self.0 as u64) ^ (1u64 << 63)).to_be_bytes()
    }
}

impl From<i64> for ChainId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte account identifier for an observer operator or grantee.
#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AccountId(pub [u8; 32]);

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_key_bytes_sort_numerically() {
        let mut ids = vec![ChainId(101), ChainId(-5), ChainId(0), ChainId(7001), ChainId(-100)];
        let mut by_key = ids.clone();
        ids.sort();
        by_key.sort_by_key(|c| c.to_key_bytes());
        assert_eq!(ids, by_key);
    }

    #[test]
    fn account_id_displays_as_hex() {
        let id = AccountId([0xab; 32]);
        assert_eq!(id.to_string(), "ab".repeat(32));
    }
}
