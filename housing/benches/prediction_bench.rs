//! Benchmarks for single-row prediction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use housing::ml::{targets, HousingEstimator, Preprocessor, RidgeRegression};
use housing::testing::{ocean_proximity_domain, sample_record, synthetic_records};
use housing::web::format_currency;

fn fitted_estimator() -> HousingEstimator {
    let records = synthetic_records(1_000, 7);
    let preprocessor = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
    let x = preprocessor.transform(&records).unwrap();
    let y = targets(&records).unwrap();
    let model = RidgeRegression::fit(x.view(), y.view(), 1.0).unwrap();
    HousingEstimator::new("ridge", 0.0, preprocessor, model).unwrap()
}

fn prediction_benchmark(c: &mut Criterion) {
    let estimator = fitted_estimator();
    let record = sample_record();

    c.bench_function("predict_single_row", |b| {
        b.iter(|| estimator.predict(black_box(&record)).unwrap())
    });

    let batch = synthetic_records(256, 8);
    c.bench_function("predict_batch_256", |b| {
        b.iter(|| estimator.predict_batch(black_box(&batch)).unwrap())
    });

    c.bench_function("format_currency", |b| {
        b.iter(|| format_currency(black_box(452_600.0)))
    });
}

criterion_group!(benches, prediction_benchmark);
criterion_main!(benches);
