//! Heap accounting for registrations, backed by dhat.
//!
//! Profiling is compiled in only with the `memory_profiling` feature:
//!
//! ```bash
//! cargo bench -p rusty_bench --features memory_profiling
//! ```
//!
//! The run leaves a `dhat-heap.json` that can be loaded into
//! <https://nnethercote.github.io/dh_view/dh_view.html>.

use std::fmt;
use std::sync::{Arc, Weak};

use rusty_notify::{DispatchTable, Notifier, Observer, WeakNotifier};

use crate::fixtures::Counter;

/// Heap usage observed while a closure ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapUsage {
    pub bytes: u64,
    pub blocks: u64,
    pub peak_bytes: u64,
}

impl HeapUsage {
    /// Average bytes per registration; zero when nothing was registered.
    pub fn bytes_per_registration(&self, registrations: usize) -> f64 {
        per(self.bytes, registrations)
    }

    /// Average allocations per registration; zero when nothing was registered.
    pub fn blocks_per_registration(&self, registrations: usize) -> f64 {
        per(self.blocks, registrations)
    }
}

fn per(total: u64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total as f64 / count as f64 }
}

impl fmt::Display for HeapUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in {} blocks (peak {} bytes)",
            self.bytes, self.blocks, self.peak_bytes
        )
    }
}

/// Serializes probes: dhat allows a single running profiler per process.
#[cfg(feature = "memory_profiling")]
static PROFILER: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(feature = "memory_profiling")]
pub struct HeapProbe {
    // Dropped before the guard so the next probe never sees a live profiler.
    _profiler: dhat::Profiler,
    _guard: std::sync::MutexGuard<'static, ()>,
}

#[cfg(feature = "memory_profiling")]
impl HeapProbe {
    /// Blocks while another probe is active.
    pub fn start() -> Self {
        let guard = PROFILER
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Self {
            _profiler: dhat::Profiler::new_heap(),
            _guard: guard,
        }
    }

    pub fn finish(self) -> HeapUsage {
        let stats = dhat::HeapStats::get();
        HeapUsage {
            bytes: stats.total_bytes as u64,
            blocks: stats.total_blocks as u64,
            peak_bytes: stats.max_bytes as u64,
        }
    }
}

#[cfg(not(feature = "memory_profiling"))]
pub struct HeapProbe;

#[cfg(not(feature = "memory_profiling"))]
impl HeapProbe {
    pub fn start() -> Self {
        Self
    }

    pub fn finish(self) -> HeapUsage {
        HeapUsage::default()
    }
}

/// Runs `f` under a [`HeapProbe`].
pub fn measure<F, R>(f: F) -> (R, HeapUsage)
where
    F: FnOnce() -> R,
{
    let probe = HeapProbe::start();
    let result = f();
    (result, probe.finish())
}

/// Fills a fresh table with `count` registrations spread over `topics` names and
/// reports what it cost. Weak registrations are kept alive through the returned
/// owners.
pub fn measure_registrations(
    count: usize,
    topics: usize,
    weak: bool,
) -> (DispatchTable, Vec<Arc<Counter>>, HeapUsage) {
    let names = crate::fixtures::topic_names(topics.max(1));
    let ((table, owners), usage) = measure(|| {
        let table = DispatchTable::new();
        let mut owners = Vec::with_capacity(count);
        for i in 0..count {
            let counter = Arc::new(Counter::default());
            let name = Some(names[i % names.len()].as_str());
            if weak {
                let observer = Arc::downgrade(&counter) as Weak<dyn Observer>;
                table
                    .add_weak_observer(observer, name, None)
                    .expect("generated names are never empty");
            } else {
                table
                    .add_observer(counter.clone(), name, None)
                    .expect("generated names are never empty");
            }
            owners.push(counter);
        }
        (table, owners)
    });
    (table, owners, usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_display() {
        let usage = HeapUsage {
            bytes: 1024,
            blocks: 10,
            peak_bytes: 512,
        };
        assert_eq!(usage.to_string(), "1024 bytes in 10 blocks (peak 512 bytes)");
    }

    #[test]
    fn per_registration_averages() {
        let usage = HeapUsage {
            bytes: 6400,
            blocks: 200,
            peak_bytes: 0,
        };
        assert!((usage.bytes_per_registration(100) - 64.0).abs() < f64::EPSILON);
        assert!((usage.blocks_per_registration(100) - 2.0).abs() < f64::EPSILON);
        assert_eq!(usage.bytes_per_registration(0), 0.0);
    }

    #[test]
    fn registrations_are_filed_across_topics() {
        let (table, owners, _usage) = measure_registrations(12, 3, true);

        assert_eq!(owners.len(), 12);
        assert_eq!(table.total_registrations(), 12);
        assert_eq!(table.bucket_count(), 3);
    }

    #[cfg(feature = "memory_profiling")]
    #[test]
    fn profiled_registrations_report_allocations() {
        let (_table, _owners, usage) = measure_registrations(100, 4, false);

        // One allocation per observer at the very least
        assert!(usage.bytes > 0, "no heap recorded: {usage}");
        assert!(usage.blocks >= 100, "too few blocks: {usage}");
        assert!(usage.peak_bytes > 0);
    }
}
