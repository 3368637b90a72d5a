// Path: crates/execution/src/lib.rs
//! # Observer Core Execution Crate Lints
//!
//! Panics are disallowed in non-test code. Every error reaches the caller.
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
//! # Observer Core Execution
//!
//! Applies external inputs to the observer services. Each input runs under
//! its own `StateOverlay` and commits atomically on success; a rejected input
//! leaves the store untouched. End-block hooks run afterwards in service-id
//! order under one more overlay.

pub mod app;
pub mod error;

pub use crate::app::{BlockOutcome, ExecutionMachine, ServiceCall, SignedCall, TxReceipt};
pub use crate::error::ExecutionError;
