use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use vitals_monitor::{AnomalyFlagger, Dataset, DiagnosticReport, Signal};

/// Synthetic day of minute-resolution readings with a few excursions
fn synthetic_dataset(rows: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    let mut ds = Dataset::new(vec![
        "timestamp".to_string(),
        "o2_level".to_string(),
        "heart_rate".to_string(),
    ]);

    for i in 0..rows {
        let o2: f64 = if rng.gen_bool(0.01) { rng.gen_range(82.0..90.0) } else { rng.gen_range(93.0..99.5) };
        let hr: f64 = if rng.gen_bool(0.01) { rng.gen_range(120.0..180.0) } else { rng.gen_range(60.0..100.0) };
        ds.push_row(vec![i.to_string(), format!("{:.1}", o2), format!("{:.0}", hr)]);
    }
    ds
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostic_report");
    for rows in [1_440, 10_080, 43_200] {
        let ds = synthetic_dataset(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &ds, |b, ds| {
            b.iter(|| DiagnosticReport::from_dataset(black_box(ds)).unwrap());
        });
    }
    group.finish();
}

fn bench_flagging(c: &mut Criterion) {
    let flagger = AnomalyFlagger::default();
    let mut group = c.benchmark_group("anomaly_flag");
    for rows in [1_440, 10_080, 43_200] {
        let ds = synthetic_dataset(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &ds, |b, ds| {
            b.iter(|| flagger.flag(black_box(ds), Signal::HeartRate).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_report, bench_flagging);
criterion_main!(benches);
