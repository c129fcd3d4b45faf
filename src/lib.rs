//! fraudscore — behavioral fraud risk scoring for financial transactions.
//!
//! Modular structure:
//! - [`ingest`] — Delimited table reading and table role assignment
//! - [`schema`] — Declarative schema validation
//! - [`record`] — Typed transaction and pattern records
//! - [`merge`] — Left join of transactions onto behavioral patterns
//! - [`features`] — Batch feature derivation (temporal, ratio, risk flags)
//! - [`model`] — Pre-trained classifier capability (ONNX inference)
//! - [`scoring`] — Threshold scoring
//! - [`metrics`] — Prediction quality metrics
//! - [`pipeline`] — End-to-end orchestration
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod ingest;
pub mod schema;
pub mod record;
pub mod merge;
pub mod features;
pub mod model;
pub mod scoring;
pub mod metrics;
pub mod pipeline;
pub mod logging;

pub use config::PipelineConfig;
pub use features::{FeatureDeriver, FeatureVector};
pub use ingest::Table;
pub use merge::MergedRecord;
pub use metrics::MetricsSummary;
pub use model::{Classifier, OnnxClassifier};
pub use pipeline::{Pipeline, PipelineError, ScoreBundle};
pub use schema::Schema;
pub use scoring::Scorer;
pub use logging::StructuredLogger;
