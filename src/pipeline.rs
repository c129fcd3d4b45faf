//! End-to-end scoring pipeline: validate → merge → derive → score → metrics.
//!
//! Strictly linear, no retries: the first failing stage returns a terminal
//! error and no partial predictions. Each invocation owns its tables and
//! intermediates; the classifier is the only shared resource.

use crate::config::PipelineConfig;
use crate::features::{FeatureDeriver, FeatureError};
use crate::ingest::Table;
use crate::merge::{self, MergeError};
use crate::metrics::MetricsSummary;
use crate::model::Classifier;
use crate::record::{PatternRecord, TransactionRecord};
use crate::schema::{self, Schema};
use crate::scoring::{Prediction, ScoreError, Scorer};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Schema(String),
    #[error(transparent)]
    MergeCardinality(#[from] MergeError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoreError),
}

/// Successful result: one prediction per surviving row, metrics when every
/// row carried an expected label (`{}` in JSON otherwise).
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBundle {
    pub predictions: Vec<Prediction>,
    #[serde(serialize_with = "metrics_or_empty")]
    pub metrics: Option<MetricsSummary>,
}

fn metrics_or_empty<S: Serializer>(
    metrics: &Option<MetricsSummary>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match metrics {
        Some(m) => m.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// The error shape callers receive: `{"error": <message>}`.
pub fn error_json(err: &dyn std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": err.to_string() })
}

pub struct Pipeline {
    scorer: Scorer,
    classifier: Arc<dyn Classifier>,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            scorer: Scorer::new(&config.scoring),
            classifier,
        }
    }

    /// Run one request-scoped invocation over two raw tables.
    pub fn run(
        &self,
        transactions: &Table,
        patterns: &Table,
    ) -> Result<ScoreBundle, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);
        let _guard = span.enter();

        for (table, schema) in [
            (transactions, Schema::transactions()),
            (patterns, Schema::patterns()),
        ] {
            let report = schema::validate(table, &schema);
            if !report.is_ok() {
                return Err(PipelineError::Schema(report.message()));
            }
        }
        info!(
            transaction_rows = transactions.row_count(),
            pattern_rows = patterns.row_count(),
            "tables validated"
        );

        let transaction_records = TransactionRecord::from_table(transactions);
        let pattern_records = PatternRecord::from_table(patterns);
        let merged = merge::left_join(&transaction_records, &pattern_records)?;

        let derived = FeatureDeriver::derive(&merged)?;
        info!(
            merged_rows = merged.len(),
            derived_rows = derived.len(),
            "features derived"
        );

        let predictions = self.scorer.score(&derived, self.classifier.as_ref())?;

        let metrics = compute_metrics(&predictions);
        info!(
            predictions = predictions.len(),
            has_metrics = metrics.is_some(),
            "pipeline complete"
        );

        Ok(ScoreBundle {
            predictions,
            metrics,
        })
    }
}

/// Metrics need ground truth on every row of the batch; a label-less batch
/// yields no metrics, which is not an error.
fn compute_metrics(predictions: &[Prediction]) -> Option<MetricsSummary> {
    if predictions.is_empty() {
        return None;
    }
    let expected: Option<Vec<i64>> = predictions.iter().map(|p| p.expected_target).collect();
    let expected = expected?;
    let predicted: Vec<i64> = predictions.iter().map(|p| p.target).collect();
    Some(MetricsSummary::from_labels(&predicted, &expected))
}
