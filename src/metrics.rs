//! Classification quality metrics over predicted vs. expected labels.

use serde::{Deserialize, Serialize};

/// Confusion-matrix counts for the positive (fraud) class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ConfusionCounts {
    pub fn update(&mut self, predicted: i64, expected: i64) {
        match (predicted == 1, expected == 1) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

/// Accuracy, precision, recall and F1; every zero denominator yields 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricsSummary {
    pub fn from_counts(c: &ConfusionCounts) -> Self {
        let total = c.total();
        let accuracy = if total == 0 {
            0.0
        } else {
            (c.true_positives + c.true_negatives) as f64 / total as f64
        };

        let predicted_positives = c.true_positives + c.false_positives;
        let precision = if predicted_positives == 0 {
            0.0
        } else {
            c.true_positives as f64 / predicted_positives as f64
        };

        let actual_positives = c.true_positives + c.false_negatives;
        let recall = if actual_positives == 0 {
            0.0
        } else {
            c.true_positives as f64 / actual_positives as f64
        };

        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    pub fn from_labels(predicted: &[i64], expected: &[i64]) -> Self {
        debug_assert_eq!(predicted.len(), expected.len());
        let mut counts = ConfusionCounts::default();
        for (&p, &e) in predicted.iter().zip(expected) {
            counts.update(p, e);
        }
        Self::from_counts(&counts)
    }
}
