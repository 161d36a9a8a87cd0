//! Fan-out benchmark scenario.
//!
//! A table with observers spread over many names, a share of them weakly held,
//! plus a few wildcard taps. Each round posts a seeded random sequence of names,
//! some with a sender that a subset of observers filters on.
//!
//! This scenario tests:
//! - Lookup and snapshot cost per post
//! - Sender filter evaluation
//! - Weak handle resolution on the hot path

use std::sync::{Arc, Weak};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_notify::{DispatchTable, Notifier, Observer, Sender, WeakNotifier};

use crate::fixtures::{Counter, Source, pick, topic_names};
use crate::scenarios::Scenario;

/// Configuration for the fan-out benchmark.
#[derive(Debug, Clone)]
pub struct FanOutConfig {
    /// Observers registered under a name.
    pub observers: usize,
    /// Distinct notification names.
    pub topics: usize,
    /// Observers registered on the wildcard bucket.
    pub wildcard_taps: usize,
    /// Fraction of observers registered weakly.
    pub weak_ratio: f64,
    /// Fraction of observers filtering on the scenario's sender.
    pub filtered_ratio: f64,
    /// Posts per update.
    pub posts_per_round: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            observers: 10_000,
            topics: 100,
            wildcard_taps: 4,
            weak_ratio: 0.5,
            filtered_ratio: 0.25,
            posts_per_round: 1_000,
            seed: 12345,
        }
    }
}

pub struct FanOutScenario {
    config: FanOutConfig,
    table: DispatchTable,
    names: Vec<String>,
    source: Arc<Source>,
    owners: Vec<Arc<Counter>>,
    rng: ChaCha8Rng,
}

impl Default for FanOutScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl FanOutScenario {
    pub fn new() -> Self {
        Self::with_config(FanOutConfig::default())
    }

    pub fn with_config(config: FanOutConfig) -> Self {
        let names = topic_names(config.topics.max(1));
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            table: DispatchTable::new(),
            names,
            source: Arc::new(Source),
            owners: Vec::new(),
            rng,
        }
    }

    /// Total deliveries observed so far.
    pub fn deliveries(&self) -> u64 {
        self.owners.iter().map(|c| c.hits()).sum()
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }
}

impl Scenario for FanOutScenario {
    fn name(&self) -> &'static str {
        "fan_out"
    }

    fn description(&self) -> &'static str {
        "Random posts over many named buckets with weak and sender-filtered observers"
    }

    fn registration_count(&self) -> usize {
        self.table.total_registrations()
    }

    fn setup(&mut self) {
        for _ in 0..self.config.observers {
            let counter = Arc::new(Counter::default());
            let name = pick(&mut self.rng, &self.names).to_owned();
            let sender = self
                .rng
                .gen_bool(self.config.filtered_ratio)
                .then(|| Sender::of(&self.source));
            if self.rng.gen_bool(self.config.weak_ratio) {
                let weak = Arc::downgrade(&counter) as Weak<dyn Observer>;
                self.table
                    .add_weak_observer(weak, Some(&name), sender)
                    .unwrap();
            } else {
                self.table
                    .add_observer(counter.clone(), Some(&name), sender)
                    .unwrap();
            }
            self.owners.push(counter);
        }
        for _ in 0..self.config.wildcard_taps {
            let counter = Arc::new(Counter::default());
            self.table.observe(counter.clone()).unwrap();
            self.owners.push(counter);
        }
    }

    fn update(&mut self) {
        for _ in 0..self.config.posts_per_round {
            let name = pick(&mut self.rng, &self.names);
            let sender = self.rng.gen_bool(0.5).then(|| Sender::of(&self.source));
            self.table.post_from(name, sender).unwrap();
        }
    }

    fn teardown(&mut self) {
        self.table.clear();
        self.owners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> FanOutScenario {
        FanOutScenario::with_config(FanOutConfig {
            observers: 200,
            topics: 10,
            wildcard_taps: 2,
            posts_per_round: 50,
            ..Default::default()
        })
    }

    #[test]
    fn setup_registers_every_observer() {
        // Given
        let mut scenario = small();

        // When
        scenario.setup();

        // Then
        assert_eq!(scenario.registration_count(), 202);
    }

    #[test]
    fn update_reaches_wildcard_taps_for_every_post() {
        // Given
        let mut scenario = small();
        scenario.setup();

        // When
        scenario.update();

        // Then
        assert!(scenario.deliveries() >= 2 * 50);
    }

    #[test]
    fn teardown_empties_the_table() {
        // Given
        let mut scenario = small();
        scenario.setup();

        // When
        scenario.teardown();

        // Then
        assert!(scenario.table().is_empty());
        assert_eq!(scenario.deliveries(), 0);
    }
}
