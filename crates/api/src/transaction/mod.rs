// Path: crates/api/src/transaction/mod.rs
//! Per-transition execution context.

pub mod context;
