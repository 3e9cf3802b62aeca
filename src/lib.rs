//! Feature extraction for link-aggregator posts, plus the PDF text helper used alongside it.
//!
//! [`extract_features`] turns a post's score, comment count and summary into one
//! float32 row of [`FEATURE_DIM`] values and wraps it in a [`FeatureEnvelope`]. Every failure is
//! folded into the envelope's `error` field.
//!
//! ```no_run
//! use hnfeat::{extract_features, parse_summary_arg, FeatureConfig};
//!
//! let cfg = FeatureConfig::load(None).unwrap();
//! let summary = parse_summary_arg(r#"{"articleType":"tutorial","keywords":"rust"}"#);
//! let envelope = extract_features(&cfg, 120, 45, &summary);
//! println!("{}", serde_json::to_string(&envelope).unwrap());
//! ```

mod artifacts;
pub mod config;
mod envelope;
mod error;
mod logging;
mod metrics;
mod pipeline;
mod summary;

pub use crate::artifacts::FittedTransforms;
pub use crate::config::{ArtifactFiles, ConfigLoadError, FeatureConfig};
pub use crate::envelope::{FeatureEnvelope, PdfEnvelope, DTYPE_FLOAT32};
pub use crate::error::PipelineError;
pub use crate::logging::init_logging;
pub use crate::metrics::{set_pipeline_metrics, PipelineMetrics, Stage};
pub use crate::pipeline::{
    extract_features, Component, FeatureExtractor, FeatureVector, FEATURE_DIM, NUMERIC_DIM,
    SCALER_INPUT_DIM,
};
pub use crate::summary::{parse_summary_arg, PostSummary};

pub use embed::{EmbedConfig, EmbeddingModel, MODEL_SOURCE_ENV};
pub use pdftext::{extract_text_from_pdf, extract_text_or_error, PdfError};
