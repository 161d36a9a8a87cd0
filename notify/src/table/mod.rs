//! The concurrent dispatch table.
//!
//! [`DispatchTable`] maps notification names, plus a wildcard, to ordered
//! buckets of observer registrations. Every operation runs synchronously on the
//! caller's thread and any number of threads may call in concurrently.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DispatchTable                         │
//! │  DashMap<Topic, Arc<Bucket>>                                 │
//! │   "Saved" ──► [ reg, reg, reg ]   (registration order)       │
//! │   "Closed" ─► [ reg ]                                        │
//! │   *       ──► [ reg, reg ]        (wildcard, every event)    │
//! └──────────────────────────────────────────────────────────────┘
//!  post(event) = deliver(bucket[event.name]) then deliver(bucket[*])
//! ```
//!
//! # Locking
//!
//! - Appends run while the map's entry guard is held, and empty buckets are
//!   dropped with [`DashMap::remove_if`] under the same shard lock, so an append
//!   can never land in a bucket that was just unlinked.
//! - Delivery iterates a snapshot of the bucket with no lock held. Observers may
//!   add, remove or post from inside `receive`.
//! - Dead weak observers and dead sender filters are pruned by the traversal that
//!   finds them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rusty_notify::{DispatchTable, Event, Notifier, Observer, Sender};
//!
//! struct Window;
//!
//! # fn main() -> rusty_notify::Result<()> {
//! let table = DispatchTable::new();
//! let window = Arc::new(Window);
//! let on_close: Arc<dyn Observer> = Arc::new(|e: &Event| println!("{}", e.name()));
//!
//! table.add_observer(on_close, Some("Closed"), Some(Sender::of(&window)))?;
//! table.post_from("Closed", Some(Sender::of(&window)))?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod bucket;
pub(crate) mod reference;
pub(crate) mod topic;

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use log::{debug, trace};

use crate::error::Result;
use crate::event::{Event, Sender};
use crate::notifier::{Notifier, WeakNotifier};
use crate::observer::Observer;
use bucket::Bucket;
use reference::{ObserverRef, SenderFilter};
use topic::Topic;

/// Construction options for a [`DispatchTable`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of buckets to pre-allocate room for.
    pub capacity: usize,
    /// Shard count of the underlying map. Must be a power of two greater than one.
    /// `None` uses the map's default.
    pub shard_amount: Option<usize>,
    /// Unlink buckets once they become empty.
    pub drop_empty_buckets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 0,
            shard_amount: None,
            drop_empty_buckets: true,
        }
    }
}

/// A publish/subscribe dispatch table.
///
/// See the [module documentation](self) for the concurrency model. Most callers
/// share the process-wide instance returned by [`global()`]; tests and isolated
/// subsystems construct their own.
pub struct DispatchTable {
    buckets: DashMap<Topic, Arc<Bucket>>,
    config: Config,
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTable {
    /// Creates an empty table with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty table.
    ///
    /// # Panics
    ///
    /// Panics if `config.shard_amount` is not a power of two greater than one.
    pub fn with_config(config: Config) -> Self {
        let buckets = match config.shard_amount {
            Some(shards) => {
                assert!(
                    shards > 1 && shards.is_power_of_two(),
                    "Shard amount must be a power of two greater than 1, got {shards}"
                );
                DashMap::with_capacity_and_shard_amount(config.capacity, shards)
            }
            None => DashMap::with_capacity(config.capacity),
        };
        Self { buckets, config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registrations stored under `name` (`None` = wildcard), including dead ones
    /// that have not been pruned yet.
    pub fn registration_count(&self, name: Option<&str>) -> usize {
        Topic::from_filter(name)
            .ok()
            .and_then(|topic| self.bucket(&topic))
            .map_or(0, |bucket| bucket.len())
    }

    /// Registrations stored across every bucket.
    pub fn total_registrations(&self) -> usize {
        self.buckets.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of buckets currently linked, empty ones included.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_registrations() == 0
    }

    /// Eagerly prunes dead weak observers and dead sender filters from every
    /// bucket, then drops the buckets left empty. Returns the number of pruned
    /// registrations.
    pub fn purge(&self) -> usize {
        let mut pruned = 0;
        for topic in self.topics() {
            let Some(bucket) = self.bucket(&topic) else {
                continue;
            };
            for registration in bucket.snapshot() {
                let reference = registration.reference();
                let dead = reference.is_dead()
                    || matches!(reference.sender_filter(), SenderFilter::Dead);
                if dead && registration.retire() {
                    pruned += 1;
                }
            }
            bucket.sweep();
            self.drop_if_empty(&topic, &bucket);
        }
        if pruned > 0 {
            debug!("purged {pruned} dead registration(s)");
        }
        pruned
    }

    /// Removes every registration.
    pub fn clear(&self) {
        let unlinked: Vec<(Topic, Arc<Bucket>)> = self
            .topics()
            .iter()
            .filter_map(|topic| self.buckets.remove(topic))
            .collect();
        debug!("cleared {} bucket(s)", unlinked.len());
        // Observers owned by the unlinked buckets are released here, outside the map's locks.
        drop(unlinked);
    }

    fn topics(&self) -> Vec<Topic> {
        self.buckets.iter().map(|entry| entry.key().clone()).collect()
    }

    fn bucket(&self, topic: &Topic) -> Option<Arc<Bucket>> {
        self.buckets.get(topic).map(|entry| Arc::clone(entry.value()))
    }

    fn file(&self, topic: Topic, reference: ObserverRef) {
        trace!(
            "adding {} observer under `{topic}` (sender filter: {})",
            if reference.is_weak() { "weak" } else { "strong" },
            !matches!(reference.sender_filter(), SenderFilter::Unfiltered)
        );
        let entry = self
            .buckets
            .entry(topic)
            .or_insert_with(|| Arc::new(Bucket::new()));
        entry.value().push(reference);
    }

    /// Unlinks `bucket` if it is still the one filed under `topic` and still empty.
    /// Losing the race to a concurrent append leaves the bucket in place.
    fn drop_if_empty(&self, topic: &Topic, bucket: &Arc<Bucket>) {
        if !self.config.drop_empty_buckets || !bucket.is_empty() {
            return;
        }
        let unlinked = self.buckets.remove_if(topic, |_, current| {
            Arc::ptr_eq(current, bucket) && current.is_empty()
        });
        if unlinked.is_some() {
            debug!("dropped empty bucket `{topic}`");
        }
    }

    fn remove_from(&self, topic: &Topic, target: &dyn Observer, sender: Option<&Sender>) -> usize {
        let Some(bucket) = self.bucket(topic) else {
            return 0;
        };

        let mut removed = 0;
        let mut pruned = 0;
        for registration in bucket.snapshot() {
            if registration.is_retired() {
                continue;
            }
            let reference = registration.reference();
            if reference.is_dead() {
                pruned += usize::from(registration.retire());
            } else if reference.holds(target) && reference.matches_removal(sender) {
                removed += usize::from(registration.retire());
            }
        }

        if removed + pruned > 0 {
            bucket.sweep();
        }
        if pruned > 0 {
            debug!("pruned {pruned} dead observer(s) from `{topic}`");
        }
        self.drop_if_empty(topic, &bucket);
        removed
    }

    fn deliver(&self, topic: &Topic, event: &Event) {
        let Some(bucket) = self.bucket(topic) else {
            return;
        };

        let mut pruned = 0;
        for registration in bucket.snapshot() {
            if registration.is_retired() {
                continue;
            }
            let reference = registration.reference();
            let Some(observer) = reference.resolve() else {
                pruned += usize::from(registration.retire());
                continue;
            };

            // A senderless event ignores sender filters entirely.
            if let Some(sender) = event.sender() {
                match reference.sender_filter() {
                    SenderFilter::Unfiltered => {}
                    SenderFilter::Expecting(expected) if expected == sender => {}
                    SenderFilter::Expecting(_) => continue,
                    SenderFilter::Dead => {
                        pruned += usize::from(registration.retire());
                        continue;
                    }
                }
            }

            observer.receive(event);
        }

        if pruned > 0 {
            bucket.sweep();
            debug!("pruned {pruned} dead registration(s) from `{topic}`");
        }
        self.drop_if_empty(topic, &bucket);
    }
}

impl Notifier for DispatchTable {
    fn add_observer(
        &self,
        observer: Arc<dyn Observer>,
        name: Option<&str>,
        sender: Option<Sender>,
    ) -> Result<()> {
        let topic = Topic::from_filter(name)?;
        self.file(topic, ObserverRef::strong(observer, sender));
        Ok(())
    }

    fn remove_observer(
        &self,
        observer: &dyn Observer,
        name: Option<&str>,
        sender: Option<&Sender>,
    ) -> Result<()> {
        let removed = match name {
            Some(_) => self.remove_from(&Topic::from_filter(name)?, observer, sender),
            None => self
                .topics()
                .iter()
                .map(|topic| self.remove_from(topic, observer, sender))
                .sum(),
        };
        trace!("removed {removed} registration(s) (name filter: {name:?})");
        Ok(())
    }

    fn post_notification(&self, event: &Event) {
        trace!(
            "posting `{}` (sender: {})",
            event.name(),
            event.sender().is_some()
        );
        self.deliver(&Topic::Named(event.shared_name()), event);
        self.deliver(&Topic::Any, event);
    }
}

impl WeakNotifier for DispatchTable {
    fn add_weak_observer(
        &self,
        observer: Weak<dyn Observer>,
        name: Option<&str>,
        sender: Option<Sender>,
    ) -> Result<()> {
        let topic = Topic::from_filter(name)?;
        self.file(topic, ObserverRef::weak(observer, sender));
        Ok(())
    }
}

static GLOBAL: OnceLock<DispatchTable> = OnceLock::new();

/// Returns the process-wide table, creating it on first use.
pub fn global() -> &'static DispatchTable {
    GLOBAL.get_or_init(DispatchTable::new)
}
