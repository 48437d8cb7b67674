//! Event channel throughput benchmark.
//!
//! Measures enqueue cost from notification callbacks and enqueue-then-drain
//! throughput using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dirwatch::{DirectoryWatcher, EventChannel, FilePresenter, InProcessCoordinator};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;

fn bench_enqueue(c: &mut Criterion) {
    let event = dirwatch::DirectoryChangeEvent::sub_item_changed("/bench/watched/file.txt");

    c.bench_function("enqueue_try_next", |b| {
        let channel = EventChannel::new();
        b.iter(|| {
            channel.enqueue(black_box(event.clone()));
            channel.try_next()
        });
    });
}

fn bench_drain(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let batch_sizes: &[usize] = &[16, 256, 4096];

    let mut group = c.benchmark_group("enqueue_then_drain");
    for &size in batch_sizes {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &n| {
            b.iter(|| {
                let channel = EventChannel::new();
                for i in 0..n {
                    channel.enqueue(dirwatch::DirectoryChangeEvent::sub_item_added(format!(
                        "/bench/watched/{}",
                        i
                    )));
                }
                channel.close();
                rt.block_on(async { channel.consume().count().await })
            });
        });
    }
    group.finish();
}

fn bench_callback_translation(c: &mut Criterion) {
    let coordinator = Arc::new(InProcessCoordinator::new());
    let watcher = DirectoryWatcher::builder(coordinator.clone())
        .path("/bench/watched")
        .config(dirwatch::WatcherConfig {
            trace_events: false,
            ..Default::default()
        })
        .build()
        .unwrap();
    let presenter: Arc<dyn FilePresenter> = coordinator.presenters().remove(0);
    let changed = Path::new("/bench/watched/file.txt");
    let ignored = Path::new("/bench/watched/.DS_Store");

    c.bench_function("subitem_changed", |b| {
        b.iter(|| {
            presenter.presented_subitem_did_change(black_box(changed));
            watcher.try_next_event()
        });
    });
    c.bench_function("subitem_changed_filtered", |b| {
        b.iter(|| presenter.presented_subitem_did_change(black_box(ignored)));
    });
}

criterion_group!(benches, bench_enqueue, bench_drain, bench_callback_translation);
criterion_main!(benches);
