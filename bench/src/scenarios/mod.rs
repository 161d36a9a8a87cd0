//! Dispatch workloads shaped like real applications.
//!
//! # Scenarios
//!
//! - **Fan-out**: many observers across many names, a wildcard tap, random posts
//! - **Churn**: threads registering and removing while other threads post

pub mod churn;
pub mod fan_out;

pub use churn::{ChurnConfig, ChurnScenario};
pub use fan_out::{FanOutConfig, FanOutScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Brief description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Registrations currently filed in the scenario's table.
    fn registration_count(&self) -> usize;

    /// Populate the table.
    fn setup(&mut self);

    /// Run one round of posts.
    fn update(&mut self);

    /// Drop every registration.
    fn teardown(&mut self);
}
