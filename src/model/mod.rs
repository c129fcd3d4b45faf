//! Pre-trained classifier capability.
//!
//! The pipeline orchestrates; it never trains. Anything that can turn a
//! feature row into a fraud probability plugs in through [`Classifier`].

mod onnx;

pub use onnx::OnnxClassifier;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier expects {expected} features, got {got}")]
    InputWidth { expected: usize, got: usize },
    #[error("model load failed: {0}")]
    Load(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Read-only after load; shared across concurrent pipeline invocations.
pub trait Classifier: Send + Sync {
    /// Width of the feature row the model was trained on.
    fn feature_count(&self) -> usize;

    /// Probability of the positive (fraud) class for one feature row.
    fn predict_probability(&self, row: &[f64]) -> Result<f64, ClassifierError>;
}
