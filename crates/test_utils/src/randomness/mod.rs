//! Deterministic randomness for reproducible tests

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use xco_types::app::AccountId;

/// Deterministic random number generator for tests
pub struct TestRng {
    rng: StdRng,
}

impl TestRng {
    /// Create a new test RNG with the specified seed
    pub fn new(seed: u64) -> Self {
        let mut seed_array = [0u8; 32];
        for (dst, src) in seed_array.iter_mut().zip(seed.to_le_bytes()) {
            *dst = src;
        }
        Self {
            rng: StdRng::from_seed(seed_array),
        }
    }

    /// Create a test RNG seeded by hashing a string, so builders keyed by an
    /// index always produce the same entity for that index.
    pub fn from_str_seed(seed: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self {
            rng: StdRng::from_seed(digest),
        }
    }

    /// Create a test RNG with the default seed 12345
    pub fn with_default_seed() -> Self {
        Self::new(12345)
    }

    /// Fill a buffer with random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    /// Generate a random value
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform value in `[low, high)`.
    pub fn u64_in_range(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..high)
    }

    /// Uniform value in `[low, high)`.
    pub fn i64_in_range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..high)
    }

    /// Non-negative value, like an int63 draw.
    pub fn next_i63(&mut self) -> i64 {
        (self.rng.next_u64() >> 1) as i64
    }

    /// A random account.
    pub fn account_id(&mut self) -> AccountId {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        AccountId(bytes)
    }

    /// Random alphanumeric string of length `n`.
    pub fn string(&mut self, n: usize) -> String {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        (0..n)
            .map(|_| {
                let i = self.rng.gen_range(0..CHARSET.len());
                CHARSET.get(i).copied().map(char::from).unwrap_or('a')
            })
            .collect()
    }

    /// Random 20-byte hex address with `0x` prefix.
    pub fn eth_address(&mut self) -> String {
        let mut bytes = [0u8; 20];
        self.rng.fill_bytes(&mut bytes);
        format!("0x{}", hex::encode(bytes))
    }

    /// Random 33-byte compressed-key-shaped hex string.
    pub fn pubkey_hex(&mut self) -> String {
        let mut bytes = [0u8; 33];
        self.rng.fill_bytes(&mut bytes);
        if let Some(first) = bytes.first_mut() {
            *first = 0x02;
        }
        hex::encode(bytes)
    }
}

impl Default for TestRng {
    fn default() -> Self {
        Self::with_default_seed()
    }
}
