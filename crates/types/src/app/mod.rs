// Path: crates/types/src/app/mod.rs
//! Application-level entities of the observer core.

mod ballot;
mod blame;
mod chain_params;
mod events;
mod identity;
mod nonce;
mod observer;
mod threshold;
mod tss;

pub use ballot::*;
pub use blame::*;
pub use chain_params::*;
pub use events::*;
pub use identity::*;
pub use nonce::*;
pub use observer::*;
pub use threshold::*;
pub use tss::*;
