//! Benchmark utilities for the dispatch table.
//!
//! - **Microbenchmarks**: add, post and remove costs in isolation
//! - **Scenario benchmarks**: fan-out and churn workloads across threads
//! - **Memory tracking**: heap allocation profiling via dhat. With the
//!   `memory_profiling` feature this crate installs dhat's global allocator, so
//!   every binary linking it (benches and tests) is tracked.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_bench -- post
//!
//! # Run with memory profiling (slower)
//! cargo bench -p rusty_bench --features memory_profiling
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.

#[cfg(feature = "memory_profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

pub mod fixtures;
pub mod memory;
pub mod scenarios;
