// Path: crates/api/src/state/typed.rs
//! Typed helpers over `StateAccess` using the canonical codec.

use crate::state::StateAccess;
use parity_scale_codec::{Decode, Encode};
use xco_types::codec;
use xco_types::error::StateError;

/// Canonical-codec convenience methods for any `StateAccess`.
pub trait StateAccessExt: StateAccess {
    /// Reads and decodes the value under `key`.
    fn get_typed<T: Decode>(&self, key: &[u8]) -> Result<Option<T>, StateError> {
        match self.get(key)? {
            Some(bytes) => codec::from_bytes_canonical(&bytes)
                .map(Some)
                .map_err(StateError::Decode),
            None => Ok(None),
        }
    }

    /// Encodes and writes `value` under `key`.
    fn put_typed<T: Encode>(&mut self, key: &[u8], value: &T) -> Result<(), StateError> {
        let bytes = codec::to_bytes_canonical(value).map_err(StateError::InvalidValue)?;
        self.insert(key, &bytes)
    }

    /// Decodes every value under `prefix`, in key order.
    fn scan_typed<T: Decode>(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, T)>, StateError> {
        let mut out = Vec::new();
        for item in self.prefix_scan(prefix)? {
            let (key, value) = item?;
            let decoded = codec::from_bytes_canonical(&value).map_err(StateError::Decode)?;
            out.push((key.to_vec(), decoded));
        }
        Ok(out)
    }
}

impl<S: StateAccess + ?Sized> StateAccessExt for S {}
