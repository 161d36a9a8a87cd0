//! Dispatch table scenario benchmarks using Criterion.
//!
//! These benchmarks measure realistic workloads:
//! - Fan-out (many observers, mixed retention, sender filters)
//! - Churn (concurrent posting against registration turnover)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rusty_bench::scenarios::{ChurnConfig, ChurnScenario, FanOutConfig, FanOutScenario, Scenario};

// =============================================================================
// Fan-Out Benchmarks
// =============================================================================

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/fan_out");

    let configs = [
        (
            "small",
            FanOutConfig {
                observers: 1_000,
                topics: 10,
                ..Default::default()
            },
        ),
        ("medium", FanOutConfig::default()),
        (
            "large",
            FanOutConfig {
                observers: 50_000,
                topics: 500,
                ..Default::default()
            },
        ),
    ];

    for (name, config) in configs {
        group.throughput(Throughput::Elements(config.posts_per_round as u64));

        group.bench_function(BenchmarkId::new("round", name), |b| {
            let mut scenario = FanOutScenario::with_config(config.clone());
            scenario.setup();

            b.iter(|| {
                scenario.update();
            });

            scenario.teardown();
        });
    }

    group.finish();
}

// =============================================================================
// Churn Benchmarks
// =============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/churn");
    group.sample_size(20);

    for threads in [1, 2, 4] {
        let config = ChurnConfig {
            posting_threads: threads,
            churning_threads: threads,
            ..Default::default()
        };
        let operations = (config.posting_threads + config.churning_threads) * config.operations;
        group.throughput(Throughput::Elements(operations as u64));

        group.bench_function(BenchmarkId::new("round", threads), |b| {
            let mut scenario = ChurnScenario::with_config(config.clone());
            scenario.setup();

            b.iter(|| {
                scenario.update();
            });

            scenario.teardown();
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_fan_out, bench_churn);

criterion_main!(benches);
