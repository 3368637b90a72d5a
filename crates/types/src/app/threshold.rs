// Path: crates/types/src/app/threshold.rs
//! Fixed-point voting thresholds.

use crate::error::ThresholdError;
use parity_scale_codec::{Decode, Encode, Input};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of parts that make up a threshold of exactly one.
pub const THRESHOLD_SCALE: u64 = 1_000_000_000;
const THRESHOLD_DECIMALS: usize = 9;

/// A fraction in `[0, 1]` stored as parts per [`THRESHOLD_SCALE`].
///
/// Thresholds never touch floating point. Comparisons against a vote tally are
/// done by integer cross-multiplication, so every replica computes the same
/// outcome for the same inputs.
#[derive(Encode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Threshold(u64);

impl Threshold {
    /// A threshold met by any non-zero weight.
    pub const ZERO: Threshold = Threshold(0);
    /// A threshold that requires unanimity.
    pub const ONE: Threshold = Threshold(THRESHOLD_SCALE);

    /// Builds a threshold from raw parts per [`THRESHOLD_SCALE`].
    pub fn from_parts(parts: u64) -> Result<Self, ThresholdError> {
        if parts > THRESHOLD_SCALE {
            return Err(ThresholdError::OutOfRange(format!("{parts}/{THRESHOLD_SCALE}")));
        }
        Ok(Self(parts))
    }

    /// Builds a threshold from `num / den`, rounding down to the nearest part.
    pub fn from_ratio(num: u64, den: u64) -> Result<Self, ThresholdError> {
        if den == 0 {
            return Err(ThresholdError::Parse(format!("{num}/0")));
        }
        if num > den {
            return Err(ThresholdError::OutOfRange(format!("{num}/{den}")));
        }
        let parts = (num as u128 * THRESHOLD_SCALE as u128) / den as u128;
        Ok(Self(parts as u64))
    }

    /// The raw parts per [`THRESHOLD_SCALE`].
    pub fn parts(&self) -> u64 {
        self.0
    }

    /// True if `weight / total >= self`. A zero total never meets a threshold.
    pub fn is_met(&self, weight: u64, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        weight as u128 * THRESHOLD_SCALE as u128 >= self.0 as u128 * total as u128
    }
}

impl Decode for Threshold {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let parts = u64::decode(input)?;
        Self::from_parts(parts).map_err(|_| "Threshold exceeds scale".into())
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
            || frac_part.len() > THRESHOLD_DECIMALS
        {
            return Err(ThresholdError::Parse(s.to_string()));
        }
        let int: u64 = int_part
            .parse()
            .map_err(|_| ThresholdError::Parse(s.to_string()))?;
        if int > 1 {
            return Err(ThresholdError::OutOfRange(s.to_string()));
        }
        let mut frac: u64 = 0;
        if !frac_part.is_empty() {
            let padded = format!("{:0<width$}", frac_part, width = THRESHOLD_DECIMALS);
            frac = padded
                .parse()
                .map_err(|_| ThresholdError::Parse(s.to_string()))?;
        }
        let parts = int * THRESHOLD_SCALE + frac;
        Self::from_parts(parts).map_err(|_| ThresholdError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / THRESHOLD_SCALE;
        let frac = self.0 % THRESHOLD_SCALE;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{:0width$}", frac, width = THRESHOLD_DECIMALS);
        write!(f, "{}.{}", int, digits.trim_end_matches('0'))
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
