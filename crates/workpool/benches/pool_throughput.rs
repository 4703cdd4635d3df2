//! Pool throughput benchmark
//!
//! Benchmarks the critical path: submit → hand-off → execute → drain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use workpool::{task_fn, WorkerPool};

/// Single submitter, no-op tasks: measures raw hand-off cost
fn bench_submit_single(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("pool/submit_single");
    group.throughput(Throughput::Elements(1));

    for size in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::new("executors", size), &size, |b, &size| {
            b.to_async(&rt).iter_custom(|iters| async move {
                let pool = WorkerPool::new(size).unwrap();
                let done = Arc::new(AtomicU64::new(0));

                let start = Instant::now();
                for _ in 0..iters {
                    let done = Arc::clone(&done);
                    pool.submit(task_fn("noop", move || {
                        done.fetch_add(1, Ordering::Relaxed);
                        futures::future::ready(Ok(()))
                    }))
                    .await
                    .unwrap();
                }
                pool.shutdown().await;
                let elapsed = start.elapsed();

                assert_eq!(done.load(Ordering::Relaxed), iters);
                elapsed
            });
        });
    }

    group.finish();
}

/// Many submitters, tasks with simulated I/O wait
fn bench_submit_concurrent(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("pool/submit_concurrent");
    group.sample_size(20);

    for size in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("executors", size), &size, |b, &size| {
            b.to_async(&rt).iter_custom(|iters| async move {
                let pool = Arc::new(WorkerPool::new(size).unwrap());
                let submitters = 8u64;
                let per_submitter = iters.div_ceil(submitters).max(1);

                let start = Instant::now();
                let mut handles = Vec::new();
                for _ in 0..submitters {
                    let pool = Arc::clone(&pool);
                    handles.push(tokio::spawn(async move {
                        for _ in 0..per_submitter {
                            pool.submit(task_fn("io_wait", || async {
                                tokio::time::sleep(Duration::from_micros(200)).await;
                                Ok(())
                            }))
                            .await
                            .unwrap();
                        }
                    }));
                }

                for handle in handles {
                    handle.await.unwrap();
                }
                pool.shutdown().await;
                start.elapsed()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_submit_single, bench_submit_concurrent);

criterion_main!(benches);
