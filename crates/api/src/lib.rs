// Path: crates/api/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # Observer Core API
//!
//! The seams between the observer services and whatever hosts them: the
//! key-value `StateAccess` trait every operation receives, the copy-on-write
//! overlay that gives each input an all-or-nothing commit, the per-transition
//! `TxContext`, and the `BlockchainService` dispatch traits.

/// Governance and internal-call permission checks.
pub mod governance;
/// Block lifecycle hooks.
pub mod lifecycle;
/// Service traits and the service directory.
pub mod services;
/// State access traits and in-memory implementations.
pub mod state;
/// Transition context.
pub mod transaction;
