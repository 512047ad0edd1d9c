use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minebench::{DatasetName, MetricValue, NoopSink, ResultStore};
use std::sync::Arc;

fn bench_insertions(c: &mut Criterion) {
    c.bench_function("add_result_distinct_keys", |b| {
        let dataset = DatasetName::new("bench");
        b.iter(|| {
            let mut store = ResultStore::with_sink(Arc::new(NoopSink));
            for i in 0..1000 {
                let metric = format!("metric-{i}");
                store.add_result(&dataset, "run", &metric, MetricValue::Number(i as f64));
            }
            black_box(store)
        });
    });

    c.bench_function("add_result_collision_probing", |b| {
        let dataset = DatasetName::new("bench");
        b.iter(|| {
            let mut store = ResultStore::with_sink(Arc::new(NoopSink));
            for i in 0..200 {
                store.add_result(&dataset, "run", "metric", MetricValue::Number(i as f64));
            }
            black_box(store)
        });
    });
}

criterion_group!(benches, bench_insertions);
criterion_main!(benches);
