//! Churn benchmark scenario.
//!
//! Several threads post to a small set of names while others keep registering
//! and removing observers on the same names, and weak observers are dropped
//! mid-flight.
//!
//! This scenario tests:
//! - Contention on bucket creation and empty-bucket drops
//! - Snapshot delivery under concurrent removal
//! - Lazy pruning of dead weak registrations

use std::sync::{Arc, Weak};
use std::thread;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rusty_notify::{DispatchTable, Notifier, Observer, WeakNotifier};

use crate::fixtures::{Counter, pick, topic_names};
use crate::scenarios::Scenario;

/// Configuration for the churn benchmark.
#[derive(Debug, Clone)]
pub struct ChurnConfig {
    /// Long-lived observers registered at setup.
    pub resident_observers: usize,
    /// Distinct notification names.
    pub topics: usize,
    /// Threads posting during an update.
    pub posting_threads: usize,
    /// Threads adding and removing during an update.
    pub churning_threads: usize,
    /// Operations per thread per update.
    pub operations: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            resident_observers: 1_000,
            topics: 8,
            posting_threads: 4,
            churning_threads: 2,
            operations: 500,
            seed: 12345,
        }
    }
}

pub struct ChurnScenario {
    config: ChurnConfig,
    table: Arc<DispatchTable>,
    names: Arc<Vec<String>>,
    residents: Vec<Arc<Counter>>,
    round: u64,
}

impl Default for ChurnScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl ChurnScenario {
    pub fn new() -> Self {
        Self::with_config(ChurnConfig::default())
    }

    pub fn with_config(config: ChurnConfig) -> Self {
        let names = Arc::new(topic_names(config.topics.max(1)));
        Self {
            config,
            table: Arc::new(DispatchTable::new()),
            names,
            residents: Vec::new(),
            round: 0,
        }
    }

    /// Deliveries received by the resident observers.
    pub fn resident_deliveries(&self) -> u64 {
        self.residents.iter().map(|c| c.hits()).sum()
    }

    fn post_round(table: &DispatchTable, names: &[String], seed: u64, operations: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..operations {
            table.post(pick(&mut rng, names)).unwrap();
        }
    }

    fn churn_round(table: &DispatchTable, names: &[String], seed: u64, operations: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in 0..operations {
            let name = pick(&mut rng, names);
            let counter = Arc::new(Counter::default());
            if i % 2 == 0 {
                table.observe_named(counter.clone(), name).unwrap();
                table.remove_named(&*counter, name).unwrap();
            } else {
                // Dropped at the end of the iteration; the next post through this
                // bucket prunes it.
                let weak = Arc::downgrade(&counter) as Weak<dyn Observer>;
                table.observe_weak_named(weak, name).unwrap();
            }
        }
    }
}

impl Scenario for ChurnScenario {
    fn name(&self) -> &'static str {
        "churn"
    }

    fn description(&self) -> &'static str {
        "Concurrent posting against threads adding, removing and dropping observers"
    }

    fn registration_count(&self) -> usize {
        self.table.total_registrations()
    }

    fn setup(&mut self) {
        for i in 0..self.config.resident_observers {
            let counter = Arc::new(Counter::default());
            let name = &self.names[i % self.names.len()];
            self.table.observe_named(counter.clone(), name).unwrap();
            self.residents.push(counter);
        }
    }

    fn update(&mut self) {
        self.round += 1;
        let base = self.config.seed ^ self.round.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let operations = self.config.operations;

        thread::scope(|scope| {
            for t in 0..self.config.posting_threads {
                let table = &self.table;
                let names = &self.names;
                scope.spawn(move || Self::post_round(table, names, base + t as u64, operations));
            }
            for t in 0..self.config.churning_threads {
                let table = &self.table;
                let names = &self.names;
                scope.spawn(move || Self::churn_round(table, names, !base - t as u64, operations));
            }
        });
    }

    fn teardown(&mut self) {
        self.table.clear();
        self.residents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ChurnScenario {
        ChurnScenario::with_config(ChurnConfig {
            resident_observers: 16,
            topics: 4,
            posting_threads: 2,
            churning_threads: 2,
            operations: 100,
            ..Default::default()
        })
    }

    #[test]
    fn residents_receive_every_post_of_their_name() {
        // Given
        let mut scenario = small();
        scenario.setup();

        // When
        scenario.update();

        // Then: every post hits the 4 residents filed under its name
        assert_eq!(scenario.resident_deliveries(), 2 * 100 * 4);
    }

    #[test]
    fn churn_leaves_only_residents_after_purge() {
        // Given
        let mut scenario = small();
        scenario.setup();

        // When
        scenario.update();
        scenario.table.purge();

        // Then
        assert_eq!(scenario.registration_count(), 16);
    }

    #[test]
    fn teardown_empties_the_table() {
        // Given
        let mut scenario = small();
        scenario.setup();
        scenario.update();

        // When
        scenario.teardown();

        // Then
        assert_eq!(scenario.registration_count(), 0);
    }
}
