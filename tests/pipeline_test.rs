//! Integration test: ingest, validate, merge, derive, score, metrics.

use fraudscore::{
    config::PipelineConfig,
    features::MODEL_FEATURE_NAMES,
    ingest,
    model::{Classifier, ClassifierError},
    pipeline::{error_json, Pipeline, PipelineError},
};
use std::path::Path;
use std::sync::Arc;

const TRANSACTIONS: &str = "\
subject_id;date;datetime;amount;document_number;direction;label
1.0;2023-01-01;2023-01-01 12:00:00;100.0;12345;outbound;1";

const PATTERNS: &str = "\
date;subject_id;monthly_os_changes;monthly_phone_model_changes;last_phone_model_categorical;last_os_categorical;logins_last_7_days;logins_last_30_days;login_frequency_7d;login_frequency_30d;freq_change_7d_vs_mean;logins_7d_over_30d_ratio;avg_login_interval_30d;std_login_interval_30d;var_login_interval_30d;ewm_login_interval_7d;burstiness_login_interval;fano_factor_login_interval;zscore_avg_login_interval_7d
2023-01-01;1.0;0;0;model1;os1;5;20;0.5;0.67;0.1;0.25;3600.0;600.0;360000.0;3000.0;1.2;1.5;2.0";

struct ConstantClassifier {
    probability: f64,
    features: usize,
}

impl ConstantClassifier {
    fn new(probability: f64) -> Self {
        Self {
            probability,
            features: MODEL_FEATURE_NAMES.len(),
        }
    }
}

impl Classifier for ConstantClassifier {
    fn feature_count(&self) -> usize {
        self.features
    }

    fn predict_probability(&self, _row: &[f64]) -> Result<f64, ClassifierError> {
        Ok(self.probability)
    }
}

fn pipeline_with(probability: f64) -> Pipeline {
    Pipeline::new(
        &PipelineConfig::default(),
        Arc::new(ConstantClassifier::new(probability)),
    )
}

#[test]
fn config_load_default() {
    let c = PipelineConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.scoring.threshold, 0.3);
    assert_eq!(c.log.level, "info");
    assert!(c.log.json);
}

#[test]
fn single_row_end_to_end() {
    let transactions = ingest::parse_delimited(TRANSACTIONS).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let bundle = pipeline_with(0.5).run(&transactions, &patterns).unwrap();
    assert_eq!(bundle.predictions.len(), 1);
    assert_eq!(bundle.predictions[0].target, 1);
    assert_eq!(bundle.predictions[0].expected_target, Some(1));

    let metrics = bundle.metrics.expect("labels present");
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1, 1.0);
}

#[test]
fn bundle_serializes_with_merged_and_derived_fields() {
    let transactions = ingest::parse_delimited(TRANSACTIONS).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let bundle = pipeline_with(0.5).run(&transactions, &patterns).unwrap();
    let v = serde_json::to_value(&bundle).unwrap();
    let row = &v["predictions"][0];
    assert_eq!(row["target"], 1);
    assert_eq!(row["expected_target"], 1);
    assert_eq!(row["subject_id"], 1.0);
    assert_eq!(row["amount"], 100.0);
    assert_eq!(row["hour"], 12);
    assert_eq!(row["part_of_day"], "afternoon");
    assert_eq!(row["is_weekend"], 1); // 2023-01-01 is a Sunday
    assert!(row.get("date").is_none());
    assert!(row.get("datetime").is_none());
    assert_eq!(v["metrics"]["accuracy"], 1.0);
}

#[test]
fn probability_at_threshold_is_negative() {
    let transactions = ingest::parse_delimited(TRANSACTIONS).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    // strict inequality: p == threshold stays 0
    let bundle = pipeline_with(0.3).run(&transactions, &patterns).unwrap();
    assert_eq!(bundle.predictions[0].target, 0);
}

#[test]
fn missing_amount_column_aborts_with_its_name() {
    let no_amount = "\
subject_id;date;datetime;document_number;direction;label
1.0;2023-01-01;2023-01-01 12:00:00;12345;outbound;1";
    let transactions = ingest::parse_delimited(no_amount).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let err = pipeline_with(0.5)
        .run(&transactions, &patterns)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
    assert!(err.to_string().contains("amount"));

    let v = error_json(&err);
    assert!(v["error"].as_str().unwrap().contains("amount"));
}

#[test]
fn label_free_table_yields_empty_metrics() {
    let unlabeled = "\
subject_id;date;datetime;amount;document_number;direction
1.0;2023-01-01;2023-01-01 12:00:00;100.0;12345;outbound";
    let transactions = ingest::parse_delimited(unlabeled).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let bundle = pipeline_with(0.5).run(&transactions, &patterns).unwrap();
    assert_eq!(bundle.predictions.len(), 1);
    assert_eq!(bundle.predictions[0].expected_target, None);
    assert!(bundle.metrics.is_none());

    let v = serde_json::to_value(&bundle).unwrap();
    assert_eq!(v["metrics"], serde_json::json!({}));
    assert!(v["predictions"][0].get("expected_target").is_none());
}

#[test]
fn unmatched_transaction_keeps_row_with_null_pattern_fields() {
    let two_rows = "\
subject_id;date;datetime;amount;document_number;direction;label
1.0;2023-01-01;2023-01-01 12:00:00;100.0;12345;outbound;1
2.0;2023-01-05;2023-01-05 09:00:00;50.0;12346;inbound;0";
    let transactions = ingest::parse_delimited(two_rows).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let bundle = pipeline_with(0.5).run(&transactions, &patterns).unwrap();
    assert_eq!(bundle.predictions.len(), 2);

    let v = serde_json::to_value(&bundle).unwrap();
    let unmatched = &v["predictions"][1];
    assert_eq!(unmatched["subject_id"], 2.0);
    assert_eq!(unmatched["logins_last_7_days"], serde_json::Value::Null);
    assert_eq!(unmatched["any_recent_change"], 0);
}

#[test]
fn duplicate_pattern_keys_are_a_terminal_error() {
    let duplicated = format!(
        "{PATTERNS}\n2023-01-01;1.0;1;1;model2;os2;9;30;0.9;0.9;0.2;0.5;1800.0;300.0;90000.0;1500.0;0.8;1.1;1.0"
    );
    let transactions = ingest::parse_delimited(TRANSACTIONS).unwrap();
    let patterns = ingest::parse_delimited(&duplicated).unwrap();

    let err = pipeline_with(0.5)
        .run(&transactions, &patterns)
        .unwrap_err();
    assert!(matches!(err, PipelineError::MergeCardinality(_)));
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn classifier_contract_mismatch_is_a_scoring_error() {
    let transactions = ingest::parse_delimited(TRANSACTIONS).unwrap();
    let patterns = ingest::parse_delimited(PATTERNS).unwrap();

    let wrong_width = ConstantClassifier {
        probability: 0.5,
        features: 5,
    };
    let pipeline = Pipeline::new(&PipelineConfig::default(), Arc::new(wrong_width));
    let err = pipeline.run(&transactions, &patterns).unwrap_err();
    assert!(matches!(err, PipelineError::Scoring(_)));
    assert!(err.to_string().starts_with("scoring failed"));
}

#[test]
fn tables_read_from_disk_and_roles_assigned() {
    let dir = tempfile::tempdir().unwrap();
    let tx_path = dir.path().join("transactions.csv");
    let pat_path = dir.path().join("patterns.csv");
    std::fs::write(&tx_path, TRANSACTIONS).unwrap();
    std::fs::write(&pat_path, PATTERNS).unwrap();

    // pass them in the wrong order; column count decides
    let first = ingest::read_table(&pat_path).unwrap();
    let second = ingest::read_table(&tx_path).unwrap();
    let (transactions, patterns) = ingest::assign_roles(first, second);
    assert_eq!(transactions.column_count(), 7);
    assert_eq!(patterns.column_count(), 19);

    let bundle = pipeline_with(0.5).run(&transactions, &patterns).unwrap();
    assert_eq!(bundle.predictions.len(), 1);
}
