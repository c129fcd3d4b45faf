//! Applies the classifier and a fixed probability cutoff to a derived batch.

use crate::config::ScoringConfig;
use crate::features::{DerivedRow, FeatureVector, MODEL_FEATURE_NAMES};
use crate::model::{Classifier, ClassifierError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default decision cutoff for the positive class.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("feature matrix width {got} does not match the classifier contract ({expected})")]
    Contract { expected: usize, got: usize },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// One scored row: the merged + derived fields with the predicted label,
/// plus the expected label when ground truth was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub subject_id: f64,
    #[serde(flatten)]
    pub features: FeatureVector,
    pub target: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_target: Option<i64>,
}

pub struct Scorer {
    threshold: f64,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            threshold: config.threshold,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every derived row, all-or-nothing: a contract mismatch or a
    /// classifier failure on any row aborts without partial results.
    pub fn score(
        &self,
        rows: &[DerivedRow],
        classifier: &dyn Classifier,
    ) -> Result<Vec<Prediction>, ScoreError> {
        let width = MODEL_FEATURE_NAMES.len();
        if classifier.feature_count() != width {
            return Err(ScoreError::Contract {
                expected: classifier.feature_count(),
                got: width,
            });
        }

        rows.iter()
            .map(|row| {
                let probability = classifier.predict_probability(&row.features.model_row())?;
                let target = i64::from(probability > self.threshold);
                debug!(
                    subject_id = row.subject_id,
                    probability, target, "scored row"
                );
                Ok(Prediction {
                    subject_id: row.subject_id,
                    features: row.features.clone(),
                    target,
                    expected_target: row.label,
                })
            })
            .collect()
    }
}
