//! Stress tests for StageKV.
//!
//! These helpers drive a store under heavy load and concurrent access.
//! Transactions borrow the store, so concurrent helpers use scoped threads.

use stagekv_core::{CoreError, Store, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Length of text values in bytes.
    pub value_size: usize,
    /// Number of distinct keys.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            value_size: 256,
            key_count: 1_000,
        }
    }
}

fn stress_key(index: usize) -> String {
    format!("stress/{index}")
}

fn payload(size: usize) -> Value {
    Value::Text("x".repeat(size))
}

/// Run a sequential write stress test, one transaction per write.
pub fn stress_sequential_writes(store: &Store, config: &StressConfig) -> StressTestResult {
    let value = payload(config.value_size);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = stress_key(i % config.key_count);
        match store.transaction(|txn| txn.set(&key, value.clone())) {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a mixed write/read/drop stress test.
pub fn stress_mixed_operations(store: &Store, config: &StressConfig) -> StressTestResult {
    let value = payload(config.value_size);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = stress_key(i % config.key_count);

        let result = match i % 3 {
            0 => store.transaction(|txn| txn.set(&key, value.clone())),
            1 => store.get(&key).map(|_| ()),
            _ => store.transaction(|txn| txn.drop(&key)),
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run concurrent writers on disjoint keys.
///
/// Every write must succeed and every key must hold its last value.
pub fn stress_concurrent_writes(store: &Store, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let ops_per_thread = config.operations / config.threads;

    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let successful = &successful;
            let failed = &failed;
            scope.spawn(move || {
                for i in 0..ops_per_thread {
                    let key = stress_key(t);
                    let index = i64::try_from(i).unwrap_or(i64::MAX);
                    match store.transaction(|txn| txn.set(&key, index)) {
                        Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            });
        }
    });

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Result of [`stress_counter_race`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRace {
    /// Increments that committed.
    pub committed: usize,
    /// Final counter value.
    pub final_value: i64,
}

impl CounterRace {
    /// Increments overwritten by a concurrent writer.
    pub fn lost_updates(&self) -> usize {
        let kept = usize::try_from(self.final_value).unwrap_or(0);
        self.committed.saturating_sub(kept)
    }
}

/// Has every thread increment one counter by read-modify-write.
///
/// There is no conflict detection, so increments may be lost; the result
/// reports how many.
pub fn stress_counter_race(store: &Store, config: &StressConfig) -> CounterRace {
    const COUNTER: &str = "stress/counter";

    let committed = AtomicUsize::new(0);
    let ops_per_thread = config.operations / config.threads;

    thread::scope(|scope| {
        for _ in 0..config.threads {
            let committed = &committed;
            scope.spawn(move || {
                for _ in 0..ops_per_thread {
                    let result = store.transaction(|txn| {
                        let current = txn.get(COUNTER)?.and_then(|v| v.as_integer()).unwrap_or(0);
                        txn.set(COUNTER, current + 1)
                    });
                    if result.is_ok() {
                        committed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    let final_value = store
        .get(COUNTER)
        .ok()
        .flatten()
        .and_then(|v| v.as_integer())
        .unwrap_or(0);

    CounterRace {
        committed: committed.load(Ordering::Relaxed),
        final_value,
    }
}

/// Run a transaction abort stress test.
pub fn stress_transaction_aborts(store: &Store, config: &StressConfig) -> StressTestResult {
    let value = payload(config.value_size);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = stress_key(i % config.key_count);

        // Every other transaction will fail intentionally
        let should_fail = i % 2 == 0;

        let result = store.transaction(|txn| {
            txn.set(&key, value.clone())?;

            if should_fail {
                Err(CoreError::invalid_operation("intentional"))
            } else {
                Ok(())
            }
        });

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a large transaction stress test.
pub fn stress_large_transactions(store: &Store, config: &StressConfig) -> StressTestResult {
    let value = payload(config.value_size);
    let batch_size = 100; // Keys per transaction

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for batch in 0..(config.operations / batch_size) {
        let result = store.transaction(|txn| {
            for i in 0..batch_size {
                txn.set(&stress_key(batch * batch_size + i), value.clone())?;
            }
            Ok(())
        });

        match result {
            Ok(()) => successful += batch_size,
            Err(_) => failed += batch_size,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;

    fn small_config() -> StressConfig {
        StressConfig {
            operations: 200,
            threads: 4,
            value_size: 64,
            key_count: 20,
        }
    }

    #[test]
    fn test_sequential_writes() {
        let test_store = TestStore::new();
        let result = stress_sequential_writes(&test_store, &small_config());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200);
        assert_eq!(test_store.keys().unwrap().len(), 20);
    }

    #[test]
    fn test_mixed_operations() {
        let test_store = TestStore::new();
        let result = stress_mixed_operations(&test_store, &small_config());
        assert_eq!(result.failed_ops, 0);
    }

    #[test]
    fn test_concurrent_writes() {
        let test_store = TestStore::new();
        let config = small_config();

        let result = stress_concurrent_writes(&test_store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200);

        let last = i64::try_from(config.operations / config.threads - 1).unwrap();
        for t in 0..config.threads {
            assert_eq!(test_store.get(&stress_key(t)).unwrap(), Some(Value::Integer(last)));
        }
        assert!(test_store.staging_orphans().unwrap().is_empty());
    }

    #[test]
    fn test_counter_race_never_overcounts() {
        let test_store = TestStore::new();
        let race = stress_counter_race(&test_store, &small_config());

        assert_eq!(race.committed, 200);
        assert!(race.final_value >= 1);
        assert!(race.final_value <= 200);
        assert_eq!(race.lost_updates(), 200 - usize::try_from(race.final_value).unwrap());
    }

    #[test]
    fn test_transaction_aborts() {
        let test_store = TestStore::new();
        let config = StressConfig {
            operations: 100,
            ..small_config()
        };

        let result = stress_transaction_aborts(&test_store, &config);
        // Half should succeed, half should fail (intentionally)
        assert_eq!(result.successful_ops, 50);
        assert_eq!(result.failed_ops, 50);
    }

    #[test]
    fn test_large_transactions() {
        let test_store = TestStore::new();
        let config = StressConfig {
            operations: 300,
            ..small_config()
        };

        let result = stress_large_transactions(&test_store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(test_store.keys().unwrap().len(), 300);
    }
}
