//! Reference holders stored in the dispatch table.
//!
//! An [`ObserverRef`] couples an observer, held strongly or weakly, with an
//! optional sender filter. Sender filters are always weak: the table is never the
//! reason a sender stays alive.

use std::{ptr, sync::Arc, sync::Weak};

use crate::event::Sender;
use crate::handle::WeakHandle;
use crate::observer::Observer;

/// How the table holds on to an observer.
pub(crate) enum Retention {
    /// The table owns a reference and keeps the observer alive.
    Strong(Arc<dyn Observer>),
    /// Liveness tracks the observer's other owners.
    Weak(WeakHandle<dyn Observer>),
}

/// Outcome of resolving a registration's sender filter.
#[derive(Debug, PartialEq)]
pub(crate) enum SenderFilter<'a> {
    /// No filter: every sender matches.
    Unfiltered,
    /// The expected sender is still alive.
    Expecting(&'a Sender),
    /// The expected sender has been dropped; nothing can match any more.
    Dead,
}

pub(crate) struct ObserverRef {
    retention: Retention,
    sender: Option<Sender>,
}

impl ObserverRef {
    pub(crate) fn strong(observer: Arc<dyn Observer>, sender: Option<Sender>) -> Self {
        Self {
            retention: Retention::Strong(observer),
            sender,
        }
    }

    pub(crate) fn weak(observer: Weak<dyn Observer>, sender: Option<Sender>) -> Self {
        Self {
            retention: Retention::Weak(WeakHandle::from_weak(observer)),
            sender,
        }
    }

    /// Returns the observer, or `None` once a weakly held observer is gone.
    #[inline]
    pub(crate) fn resolve(&self) -> Option<Arc<dyn Observer>> {
        match &self.retention {
            Retention::Strong(observer) => Some(Arc::clone(observer)),
            Retention::Weak(handle) => handle.resolve(),
        }
    }

    #[inline]
    pub(crate) fn is_dead(&self) -> bool {
        match &self.retention {
            Retention::Strong(_) => false,
            Retention::Weak(handle) => handle.is_dead(),
        }
    }

    pub(crate) fn is_weak(&self) -> bool {
        matches!(self.retention, Retention::Weak(_))
    }

    /// Identity check that does not upgrade the weak handle, so it can never end
    /// up dropping the last owner of an observer.
    pub(crate) fn holds(&self, target: &dyn Observer) -> bool {
        match &self.retention {
            Retention::Strong(observer) => {
                ptr::addr_eq(Arc::as_ptr(observer), target as *const dyn Observer)
            }
            Retention::Weak(handle) => !handle.is_dead() && handle.points_to(target),
        }
    }

    pub(crate) fn sender_filter(&self) -> SenderFilter<'_> {
        match &self.sender {
            None => SenderFilter::Unfiltered,
            Some(sender) if sender.is_dead() => SenderFilter::Dead,
            Some(sender) => SenderFilter::Expecting(sender),
        }
    }

    /// Sender rule applied by removal.
    ///
    /// An absent `sender` argument matches every registration. Otherwise an
    /// unfiltered registration always matches, a live filter matches by identity
    /// and a dead filter never matches (it is left for dispatch to prune).
    pub(crate) fn matches_removal(&self, sender: Option<&Sender>) -> bool {
        let Some(sender) = sender else {
            return true;
        };
        match self.sender_filter() {
            SenderFilter::Unfiltered => true,
            SenderFilter::Expecting(expected) => expected == sender,
            SenderFilter::Dead => false,
        }
    }
}
