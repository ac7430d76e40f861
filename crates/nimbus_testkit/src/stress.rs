//! Stress helpers for Nimbus.
//!
//! These drive many threads against one backend to check that concurrent
//! read-modify-write cycles do not lose updates.

use nimbus_core::{Key, LocalBackend, ReceiveOptions, Task};
use serde_json::json;
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

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
        }
    }
}

#[derive(Default)]
struct Counters {
    successful: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn record<T, E>(&self, result: &Result<T, E>) {
        let counter = if result.is_ok() {
            &self.successful
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self, start: Instant) -> StressTestResult {
        StressTestResult::new(
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

/// Id of the `i`th task sent by thread `t`.
pub fn task_id(t: usize, i: usize) -> String {
    format!("t{t}-{i:05}")
}

/// Sends single-task batches to `queue` from every thread at once.
pub fn stress_concurrent_sends(
    backend: &LocalBackend,
    queue: &str,
    config: &StressConfig,
) -> StressTestResult {
    let counters = Counters::default();
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let counters = &counters;
            scope.spawn(move || {
                for i in 0..config.operations {
                    let task = Task::new(task_id(t, i), "stress");
                    counters.record(&backend.queues().send_batch(queue, vec![task]));
                }
            });
        }
    });

    counters.finish(start)
}

/// Drains `queue` from every thread at once; returns everything received.
pub fn stress_concurrent_receives(
    backend: &LocalBackend,
    queue: &str,
    depth: u32,
    config: &StressConfig,
) -> (Vec<Task>, StressTestResult) {
    let counters = Counters::default();
    let start = Instant::now();

    let received = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|_| {
                let counters = &counters;
                scope.spawn(move || {
                    let mut mine = Vec::new();
                    loop {
                        let result = backend
                            .queues()
                            .receive(ReceiveOptions::new(queue).depth(depth));
                        counters.record(&result);
                        match result {
                            Ok(tasks) if !tasks.is_empty() => mine.extend(tasks),
                            _ => break,
                        }
                    }
                    mine
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().expect("Thread panicked"))
            .collect()
    });

    (received, counters.finish(start))
}

/// Writes children of `parent` from every thread at once, each thread into
/// its own sub-collection `sub{t}`.
pub fn stress_concurrent_child_writes(
    backend: &LocalBackend,
    parent: &Key,
    config: &StressConfig,
) -> StressTestResult {
    let counters = Counters::default();
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let counters = &counters;
            scope.spawn(move || {
                let sub_collection = format!("sub{t}");
                for i in 0..config.operations {
                    let child = Key::new(sub_collection.as_str(), i.to_string());
                    counters.record(&backend.documents().set(
                        parent,
                        Some(&child),
                        json!({ "thread": t, "n": i }),
                    ));
                }
            });
        }
    });

    counters.finish(start)
}
