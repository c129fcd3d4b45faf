//! ONNX Runtime classifier. Input: [1, feature_count] f32; output: the
//! positive-class probability.

use super::{Classifier, ClassifierError};
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

static ORT_RUNTIME: OnceLock<()> = OnceLock::new();

fn init_runtime() {
    ORT_RUNTIME.get_or_init(|| {
        let _ = ort::init().with_name("fraudscore").commit();
    });
}

pub struct OnnxClassifier {
    // Session::run takes &mut self in this runtime version; the lock is
    // internal and the model itself is never mutated after load.
    session: RwLock<Session>,
    input_name: String,
    feature_count: usize,
}

impl OnnxClassifier {
    /// Load a model from disk. `feature_count` is the input width the
    /// model was exported with.
    pub fn load(path: &Path, feature_count: usize) -> Result<Self, ClassifierError> {
        init_runtime();
        let session = Session::builder()
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| ClassifierError::Load(format!("{}: {e}", path.display())))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        tracing::info!(path = %path.display(), feature_count, "classifier loaded");

        Ok(Self {
            session: RwLock::new(session),
            input_name,
            feature_count,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.feature_count {
            return Err(ClassifierError::InputWidth {
                expected: self.feature_count,
                got: row.len(),
            });
        }

        let values: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let arr = Array2::from_shape_vec((1, values.len()), values)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let input =
            Tensor::from_array(arr).map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .write()
            .map_err(|_| ClassifierError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        for (name, output) in outputs.iter() {
            // classifier exports often pair a "label" output with the
            // probability tensor; skip the label
            if name.contains("label") {
                continue;
            }
            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = shape.iter().copied().collect();
                return Ok(positive_class_probability(&dims, data).clamp(0.0, 1.0));
            }
        }

        Err(ClassifierError::Inference(
            "no probability tensor in model outputs".to_string(),
        ))
    }
}

/// Pull the positive-class probability out of the output tensor:
/// `[1, 2]` holds per-class probabilities (index 1), `[1, 1]` and `[1]` a
/// single score; anything else falls back to the last value.
fn positive_class_probability(dims: &[i64], data: &[f32]) -> f64 {
    match dims {
        [1, 2] | [2] if data.len() >= 2 => f64::from(data[1]),
        [1, 1] | [1] if !data.is_empty() => f64::from(data[0]),
        _ => data.last().map(|&v| f64::from(v)).unwrap_or(0.0),
    }
}
