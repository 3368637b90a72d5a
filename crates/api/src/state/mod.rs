// Path: crates/api/src/state/mod.rs
//! Key-value state access for the observer core.
//!
//! - `StateAccess`: the dyn-safe store interface passed into every operation.
//! - `StateAccessExt`: typed get/put/scan helpers over the canonical codec.
//! - `StateOverlay`: a copy-on-write layer giving one transition atomic commit.
//! - `MemoryState`: an ordered in-memory store for hosts and tests.

use std::sync::Arc;
use xco_types::error::StateError;

/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs in ascending key order.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

mod accessor;
mod memory;
mod overlay;
mod typed;

pub use accessor::*;
pub use memory::*;
pub use overlay::*;
pub use typed::*;
