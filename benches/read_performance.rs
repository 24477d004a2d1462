//! Performance benchmarks for apm-agent-config.
//!
//! Covers the paths an agent hits on every unit of work:
//! - Snapshot read and typed accessor latency
//! - Rebuild cost when nothing changed
//! - Reads scaling with concurrent readers while snapshots are published

use apm_agent_config::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const ENV: [(&str, &str); 6] = [
    ("ELASTIC_APM_SERVICE_NAME", "checkout"),
    ("ELASTIC_APM_LOG_LEVEL", "info"),
    ("ELASTIC_APM_TRANSACTION_SAMPLE_RATE", "0.5"),
    ("ELASTIC_APM_SERVER_TIMEOUT", "10s"),
    ("ELASTIC_APM_GLOBAL_LABELS", "env=prod,team=core"),
    ("ELASTIC_APM_SECRET_TOKEN", "s3cr3t"),
];

fn manager() -> ConfigManager {
    let manager = ConfigManager::builder().with_env_vars(ENV).build().unwrap();
    manager.ensure_has_latest_config();
    manager
}

/// Source whose value changes on every read, so every rebuild publishes.
#[derive(Default)]
struct TickingSource(AtomicU64);

impl ConfigSource for TickingSource {
    fn load(&self) -> Result<RawValues> {
        let tick = self.0.fetch_add(1, Ordering::Relaxed);
        Ok([("ELASTIC_APM_TRANSACTION_MAX_SPANS", tick.to_string())]
            .into_iter()
            .collect())
    }

    fn name(&self) -> String {
        "ticking".to_string()
    }
}

/// Benchmark single-threaded snapshot reads
fn benchmark_read_latency(c: &mut Criterion) {
    let manager = manager();

    let mut group = c.benchmark_group("read_latency");
    group.bench_function("snapshot_get", |b| {
        b.iter(|| {
            let config = manager.get();
            black_box(config.generation());
        });
    });
    group.bench_function("typed_accessors", |b| {
        let config = manager.get();
        b.iter(|| {
            black_box(config.enabled());
            black_box(config.transaction_sample_rate());
            black_box(config.server_timeout());
            black_box(config.log_level());
        });
    });
    group.bench_function("value_by_id", |b| {
        b.iter(|| black_box(manager.option_value_by_id(OptionId::TransactionMaxSpans)));
    });
    group.finish();
}

/// Benchmark rebuilds
fn benchmark_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");

    let manager = manager();
    group.bench_function("unchanged", |b| {
        b.iter(|| black_box(manager.ensure_has_latest_config()));
    });

    let ticking = ConfigManager::builder()
        .with_source(RawConfigSourceId::EnvVars, TickingSource::default())
        .build()
        .unwrap();
    group.bench_function("changed", |b| {
        b.iter(|| black_box(ticking.ensure_has_latest_config()));
    });

    group.finish();
}

/// Benchmark concurrent reads with varying thread counts
fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [1, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements(num_threads as u64 * 1000));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let manager = manager();
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let manager = manager.clone();
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                barrier.wait();
                                let start = Instant::now();
                                for _ in 0..iters {
                                    let config = manager.get();
                                    black_box(config.transaction_sample_rate());
                                }
                                start.elapsed()
                            })
                        })
                        .collect();

                    barrier.wait();

                    let total: Duration = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    total / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark publishing while 16 readers are active
fn benchmark_publish_under_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_under_load");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("publish_with_16_readers", |b| {
        b.iter_custom(|iters| {
            let manager = ConfigManager::builder()
                .with_source(RawConfigSourceId::EnvVars, TickingSource::default())
                .build()
                .unwrap();
            let keep_running = Arc::new(AtomicBool::new(true));
            let reads_completed = Arc::new(AtomicUsize::new(0));

            let readers: Vec<_> = (0..16)
                .map(|_| {
                    let manager = manager.clone();
                    let running = Arc::clone(&keep_running);
                    let counter = Arc::clone(&reads_completed);
                    thread::spawn(move || {
                        while running.load(Ordering::Relaxed) {
                            black_box(manager.get().enabled());
                            counter.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                })
                .collect();

            let start = Instant::now();
            for _ in 0..iters {
                black_box(manager.ensure_has_latest_config());
            }
            let duration = start.elapsed();

            keep_running.store(false, Ordering::Relaxed);
            for reader in readers {
                reader.join().unwrap();
            }

            println!(
                "  Completed {} reads during {} publishes",
                reads_completed.load(Ordering::Relaxed),
                iters
            );
            duration
        });
    });

    group.finish();
}

/// Benchmark report construction and rendering
fn benchmark_diagnostics(c: &mut Criterion) {
    let manager = manager();

    let mut group = c.benchmark_group("diagnostics");
    group.bench_function("build", |b| b.iter(|| black_box(manager.diagnostics())));
    group.bench_function("render", |b| {
        let report = manager.diagnostics();
        b.iter(|| black_box(report.to_string()));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_read_latency,
    benchmark_rebuild,
    benchmark_concurrent_reads,
    benchmark_publish_under_load,
    benchmark_diagnostics,
);

criterion_main!(benches);
