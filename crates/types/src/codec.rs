// Path: crates/types/src/codec.rs

//! Canonical SCALE encoding for everything written to replicated state.
//!
//! All crates go through these two functions so that every replica produces the
//! same bytes for the same value.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical SCALE byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from canonical SCALE bytes.
///
/// Trailing bytes are rejected, so a value has exactly one valid encoding.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ChainId, PendingNonces};

    #[test]
    fn pending_nonces_survive_canonical_roundtrip() {
        let pending = PendingNonces {
            chain_id: ChainId(101),
            nonce_low: 5,
            nonce_high: 9,
            tss: "tss-pubkey".to_string(),
            held: vec![7, 8],
            last_advance_height: 42,
        };
        let bytes = to_bytes_canonical(&pending).unwrap();
        let decoded: PendingNonces = from_bytes_canonical(&bytes).unwrap();
        assert_eq!(decoded, pending);
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = to_bytes_canonical(&42u64).unwrap();
        bytes.push(0);
        let res: Result<u64, _> = from_bytes_canonical(&bytes);
        assert!(res.is_err());
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let bytes = to_bytes_canonical(&42u64).unwrap();
        let res: Result<u64, _> = from_bytes_canonical(&bytes[..4]);
        assert!(res.unwrap_err().contains("canonical decode failed"));
    }
}
