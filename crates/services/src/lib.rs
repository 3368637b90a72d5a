// Path: crates/services/src/lib.rs
#![forbid(unsafe_code)]
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
//! # Observer Core Services
//!
//! The replicated components of the cross-chain observer core. Every mutating
//! entry point takes the state store explicitly and never commits on its own;
//! the caller owns the transactional boundary.

pub mod ballot;
pub mod blame;
pub mod chain_params;
pub mod genesis;
pub mod nonce;
pub mod observer;
pub mod tss;
pub mod voting;

pub use ballot::BallotBox;
pub use blame::BlameRecorder;
pub use chain_params::ChainParamsRegistry;
pub use nonce::NonceAllocator;
pub use observer::ObserverRegistry;
pub use tss::TssKeygen;
pub use voting::CrosschainVoting;
