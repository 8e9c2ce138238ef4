use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use loadsight::codec::writer::write_artifact;
use loadsight::model::{Sample, Samples};
use loadsight::stats::builder::calc_aggregate_stats;
use std::sync::Arc;

const NUM_SAMPLES: usize = 100_000;

fn synthetic_batch(num_samples: usize) -> Samples {
    let labels: Vec<Arc<str>> =
        ["home", "login", "search", "checkout"].iter().map(|&l| Arc::from(l)).collect();
    let threads: Vec<Arc<str>> =
        (0..8).map(|i| Arc::from(format!("pool-1-thread-{}", i).as_str())).collect();
    let ok_code: Arc<str> = Arc::from("200");
    let ok_message: Arc<str> = Arc::from("OK");

    let samples = (0..num_samples)
        .map(|i| Sample {
            offset_millis: i as i64 * 7,
            duration_millis: 40 + (i as i64 * 13) % 700,
            label: Arc::clone(&labels[i % labels.len()]),
            thread_name: Arc::clone(&threads[i % threads.len()]),
            status_code: Arc::clone(&ok_code),
            status_message: Arc::clone(&ok_message),
            success: i % 50 != 0,
            response_bytes: 1_000 + (i as i64 % 500),
            sent_bytes: 200,
            total_threads: 8,
        })
        .collect();

    Samples {
        samples,
        earliest_millis: 1_483_224_444_000,
        latest_millis: 1_483_224_444_000 + num_samples as i64 * 7 + 700,
    }
}

fn bench_encode(c: &mut Criterion) {
    let batch = synthetic_batch(NUM_SAMPLES);
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(NUM_SAMPLES as u64));
    group.bench_function("write_artifact_100k", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(NUM_SAMPLES * 32);
            let hash = write_artifact(black_box(&batch), &mut bytes).unwrap();
            black_box(hash);
        });
    });
    group.finish();
}

fn bench_aggregate_stats(c: &mut Criterion) {
    let batch = synthetic_batch(NUM_SAMPLES);
    let mut group = c.benchmark_group("stats");
    group.throughput(Throughput::Elements(NUM_SAMPLES as u64));
    group.bench_function("aggregate_100k", |b| {
        b.iter(|| {
            let mut samples = batch.samples.clone();
            black_box(calc_aggregate_stats(&mut samples));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_aggregate_stats);
criterion_main!(benches);
