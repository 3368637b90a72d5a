// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay that gives one transition all-or-nothing commit.

use crate::state::{StateAccess, StateKVPair, StateScanIter};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};
use std::iter::Peekable;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;
use xco_types::error::StateError;

/// Inserts and deletes produced by a transition, each in ascending key order.
pub type StateChangeSet = (Vec<(Vec<u8>, Vec<u8>)>, Vec<Vec<u8>>);

/// Smallest key strictly greater than every key starting with `prefix`.
/// `None` if the prefix is empty or all `0xFF`.
fn next_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut ub = prefix.to_vec();
    while let Some(last) = ub.pop() {
        if last != 0xFF {
            ub.push(last + 1);
            return Some(ub);
        }
    }
    None
}

struct MergingIterator<'a> {
    base: Peekable<StateScanIter<'a>>,
    writes: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> Iterator for MergingIterator<'a> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.base.peek(), self.writes.peek()) {
                // Base errors surface immediately instead of being skipped.
                (Some(Err(_)), _) => return self.base.next(),
                (Some(Ok((bk, _))), Some((wk, _))) => bk.as_ref().cmp(wk.as_slice()),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => return None,
            };
            if order == Ordering::Less {
                return self.base.next();
            }
            if order == Ordering::Equal {
                self.base.next();
            }
            if let Some((key, Some(val))) = self.writes.next() {
                return Some(Ok((Arc::from(key.as_slice()), Arc::from(val.as_slice()))));
            }
            // A pending delete shadows the base entry; keep merging.
        }
    }
}

/// An in-memory, copy-on-write overlay over any `StateAccess`.
///
/// Reads consult the local write set first and fall through to `base`.
/// Writes never reach `base`; the host commits them with
/// [`StateOverlay::into_ordered_batch`] only if the transition succeeded.
#[derive(Clone)]
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state accessor.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Consumes the overlay and returns its writes in deterministic key order.
    pub fn into_ordered_batch(self) -> StateChangeSet {
        let mut inserts = Vec::new();
        let mut deletes = Vec::new();
        for (key, value) in self.writes {
            match value {
                Some(v) => inserts.push((key, v)),
                None => deletes.push(key),
            }
        }
        (inserts, deletes)
    }
}

impl<'a> StateAccess for StateOverlay<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            Some(cached) => Ok(cached.clone()),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn batch_apply(
        &mut self,
        inserts: &[(Vec<u8>, Vec<u8>)],
        deletes: &[Vec<u8>],
    ) -> Result<(), StateError> {
        for key in deletes {
            self.delete(key)?;
        }
        for (key, value) in inserts {
            self.insert(key, value)?;
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let base = self.base.prefix_scan(prefix)?.peekable();
        let end = match next_prefix(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        let writes = self
            .writes
            .range((Included(prefix.to_vec()), end))
            .peekable();
        Ok(Box::new(MergingIterator { base, writes }))
    }
}
