//! Per-topic registration lists.
//!
//! A [`Bucket`] is an append-ordered list of [`Registration`]s behind a
//! `crossbeam` [`ShardedLock`]. Readers take a snapshot (a vector of `Arc`s) and
//! iterate it with no lock held, so observers may re-enter the table from
//! `receive`. Removal is two-phase: a registration is first *retired* through an
//! atomic flag, which every traversal checks before delivering, then a sweep
//! drops retired entries from the list.
//!
//! # Guarantees
//!
//! - Snapshots preserve registration order.
//! - An entry present for a whole traversal is visited exactly once; entries
//!   appended during a traversal may or may not be seen by it.
//! - Values released by a sweep are dropped after the lock is released, so an
//!   observer's `Drop` never runs while the bucket is locked.

use std::sync::{
    Arc, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crossbeam::sync::ShardedLock;

use super::reference::ObserverRef;

/// A single entry in a bucket.
pub(crate) struct Registration {
    reference: ObserverRef,
    retired: AtomicBool,
}

impl Registration {
    fn new(reference: ObserverRef) -> Self {
        Self {
            reference,
            retired: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn reference(&self) -> &ObserverRef {
        &self.reference
    }

    /// Marks the registration for removal. Returns `true` only for the caller that
    /// actually retired it.
    #[inline]
    pub(crate) fn retire(&self) -> bool {
        !self.retired.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

#[derive(Default)]
pub(crate) struct Bucket {
    entries: ShardedLock<Vec<Arc<Registration>>>,
}

impl Bucket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a registration at the end of the list.
    pub(crate) fn push(&self, reference: ObserverRef) {
        let registration = Arc::new(Registration::new(reference));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
    }

    /// Copies the current list for lock-free traversal.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Registration>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of stored registrations, including retired ones not yet swept.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every retired registration. Returns how many were removed.
    pub(crate) fn sweep(&self) -> usize {
        let swept: Vec<Arc<Registration>> = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if !entries.iter().any(|entry| entry.is_retired()) {
                return 0;
            }
            let (swept, kept) = std::mem::take(&mut *entries)
                .into_iter()
                .partition(|entry| entry.is_retired());
            *entries = kept;
            swept
        };
        swept.len()
    }
}
