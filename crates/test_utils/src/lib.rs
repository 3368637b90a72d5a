// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Observer Core Test Utilities
//!
//! Seeded randomness, seed-parameterized sample builders for every observer
//! entity, and assertion macros. Nothing in production depends on this crate.

pub mod assertions;
pub mod randomness;
pub mod sample;

#[doc(hidden)]
pub use xco_types::error::ErrorCode as __ErrorCode;
