//! Threshold scoring: classifier probabilities → binary fraud labels.

mod engine;

pub use engine::{Prediction, ScoreError, Scorer, DEFAULT_THRESHOLD};
