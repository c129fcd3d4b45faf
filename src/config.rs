//! Pipeline configuration: model location, scoring threshold, logging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the pre-trained ONNX classifier
    pub model_path: PathBuf,
    /// Threshold scoring parameters
    pub scoring: ScoringConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Fraud probability above this is labeled positive (0.0–1.0).
    /// A fixed decision constant, never learned per request.
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            scoring: ScoringConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: crate::scoring::DEFAULT_THRESHOLD,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl PipelineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<PipelineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
