//! Observers and names shared by the benchmarks.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use rusty_notify::{Event, Observer};

/// Observer that only counts deliveries.
#[derive(Debug, Default)]
pub struct Counter {
    hits: AtomicU64,
}

impl Counter {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

impl Observer for Counter {
    #[inline]
    fn receive(&self, _event: &Event) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }
}

/// Stand-in for an object that posts events.
#[derive(Debug, Default)]
pub struct Source;

/// Generates `count` distinct notification names.
pub fn topic_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("bench.topic.{i}")).collect()
}

/// Picks a random name from `names`.
pub fn pick<'a, R: Rng>(rng: &mut R, names: &'a [String]) -> &'a str {
    &names[rng.gen_range(0..names.len())]
}
