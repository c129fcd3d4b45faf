//! Pipeline benchmark: merged batch → aggregates → feature vectors.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fraudscore::features::{BatchAggregates, FeatureDeriver};
use fraudscore::merge::MergedRecord;
use fraudscore::record::{PatternRecord, TransactionRecord};

fn make_merged_rows(n: usize) -> Vec<MergedRecord> {
    (0..n)
        .map(|i| MergedRecord {
            transaction: TransactionRecord {
                subject_id: i as f64,
                date: "2023-01-01".to_string(),
                datetime: format!("2023-01-01 {:02}:15:00", i % 24),
                amount: 100.0 + i as f64,
                document_number: i as f64,
                direction: "outbound".to_string(),
                label: Some((i % 2) as i64),
            },
            pattern: Some(PatternRecord {
                subject_id: i as f64,
                date: "2023-01-01".to_string(),
                monthly_os_changes: (i % 3) as f64,
                monthly_phone_model_changes: (i % 2) as f64,
                last_phone_model_categorical: "model".to_string(),
                last_os_categorical: "os".to_string(),
                logins_last_7_days: (i % 20) as f64,
                logins_last_30_days: (i % 60) as f64,
                login_frequency_7d: (i % 20) as f64 / 7.0,
                login_frequency_30d: (i % 60) as f64 / 30.0,
                freq_change_7d_vs_mean: 0.1,
                logins_7d_over_30d_ratio: 0.4,
                avg_login_interval_30d: 3600.0 + i as f64,
                std_login_interval_30d: 600.0,
                var_login_interval_30d: 360_000.0,
                ewm_login_interval_7d: 3000.0,
                burstiness_login_interval: 1.2,
                fano_factor_login_interval: 1.5,
                zscore_avg_login_interval_7d: 0.5,
            }),
        })
        .collect()
}

fn bench_batch_aggregates(c: &mut Criterion) {
    let batch = make_merged_rows(1000);
    c.bench_function("batch_aggregates_1000_rows", |b| {
        b.iter(|| black_box(BatchAggregates::compute(black_box(&batch))))
    });
}

fn bench_feature_derivation(c: &mut Criterion) {
    let batch = make_merged_rows(1000);
    c.bench_function("derive_1000_rows", |b| {
        b.iter(|| black_box(FeatureDeriver::derive(black_box(&batch))))
    });
}

criterion_group!(benches, bench_batch_aggregates, bench_feature_derivation);
criterion_main!(benches);
