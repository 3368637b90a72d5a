// Path: crates/types/src/lib.rs
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

//! # Observer Core Types
//!
//! Core data structures, error taxonomy and canonical encoding shared by every
//! crate of the cross-chain observer core. This crate has no knowledge of
//! services or execution; it only describes what is stored and how it is keyed.

/// Application-level entities: ballots, observers, nonces, TSS and blame records.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical state.
pub mod codec;
/// Node and genesis configuration structures.
pub mod config;
/// Error types and stable error codes.
pub mod error;
/// State key prefixes and key builders.
pub mod keys;
/// Service capability flags and governance policy types.
pub mod service_configs;
