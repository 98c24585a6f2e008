//! Benchmarks for pull throughput through stage chains
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use shiftwork::pipeline::stages::{batch, filter, relay, source, splitter, trailing, BatchOptions};
use shiftwork::pipeline::{Gang, Task, Worker};

fn numbers(count: usize) -> Worker {
    source((0..count as i64).map(Value::from).collect::<Vec<_>>()).unwrap()
}

fn increment() -> Worker {
    relay(Task::consumer(|v| Ok(Some(json!(v.as_i64().unwrap_or(0) + 1))))).unwrap()
}

fn drain(worker: &Worker) -> usize {
    let mut count = 0;
    while let Some(value) = worker.pull().unwrap() {
        black_box(value);
        count += 1;
    }
    count
}

fn bench_relay_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_depth");
    let count = 10_000;
    group.throughput(Throughput::Elements(count as u64));

    for depth in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut tail = numbers(count);
                for _ in 0..depth {
                    tail = tail.chain_into(&increment()).unwrap();
                }
                drain(&tail)
            })
        });
    }
    group.finish();
}

fn bench_archetypes(c: &mut Criterion) {
    let mut group = c.benchmark_group("archetypes");
    let count = 10_000;
    group.throughput(Throughput::Elements(count as u64));

    group.bench_function("filter_even", |b| {
        b.iter(|| {
            let even = filter(Task::predicate(|v: &Value| {
                v.as_i64().is_some_and(|n| n % 2 == 0)
            }))
            .unwrap();
            drain(&numbers(count).chain_into(&even).unwrap())
        })
    });

    group.bench_function("batch_of_64", |b| {
        b.iter(|| {
            let batches = batch(BatchOptions::gathering(64), None).unwrap();
            drain(&numbers(count).chain_into(&batches).unwrap())
        })
    });

    group.bench_function("split_pairs", |b| {
        b.iter(|| {
            let pairs = splitter(Task::consumer(|v| Ok(Some(json!([v.clone(), v]))))).unwrap();
            drain(&numbers(count).chain_into(&pairs).unwrap())
        })
    });

    group.bench_function("trailing_8", |b| {
        b.iter(|| {
            let window = trailing(8).unwrap();
            drain(&numbers(count).chain_into(&window).unwrap())
        })
    });

    group.bench_function("gang_of_4", |b| {
        b.iter(|| {
            let gang = Gang::new((0..4).map(|_| increment())).unwrap();
            let tail = increment();
            numbers(count)
                .chain_into(&gang)
                .and_then(|g| g.chain_into(&tail))
                .unwrap();
            drain(&tail)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_relay_depth, bench_archetypes);
criterion_main!(benches);
