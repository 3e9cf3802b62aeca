//! Post feature extraction.
//!
//! One post becomes one row of [`FEATURE_DIM`] values, laid out as
//!
//! ```text
//! [ numeric (2) | type (64) | content (64) | keyword (128) ]
//! ```
//!
//! The numeric block is the first two columns of the fitted scaler applied to
//! `[ln(1 + score), ln(1 + comments), 0, 0]`. Each text block is the matching reducer applied to
//! a dense embedding of the summary field, or all zeros when the field is empty.

use std::time::Instant;

use embed::EmbeddingModel;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::artifacts::FittedTransforms;
use crate::config::FeatureConfig;
use crate::envelope::FeatureEnvelope;
use crate::error::PipelineError;
use crate::metrics::{timed, Stage};
use crate::summary::PostSummary;

/// Numeric columns kept from the scaler output.
pub const NUMERIC_DIM: usize = 2;
/// Columns the scaler was fitted on; the last two are always zero.
pub const SCALER_INPUT_DIM: usize = 4;
/// Width of one feature row.
pub const FEATURE_DIM: usize = NUMERIC_DIM
    + Component::Type.target_dim()
    + Component::Content.target_dim()
    + Component::Keyword.target_dim();

/// A text field of the summary and the reduced block it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Type,
    Content,
    Keyword,
}

impl Component {
    /// Feature row order.
    pub const ALL: [Component; 3] = [Component::Type, Component::Content, Component::Keyword];

    pub const fn target_dim(self) -> usize {
        match self {
            Component::Type => 64,
            Component::Content => 64,
            Component::Keyword => 128,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Component::Type => "type",
            Component::Content => "content",
            Component::Keyword => "keyword",
        }
    }

    /// Start column of this block in the feature row.
    pub const fn offset(self) -> usize {
        match self {
            Component::Type => NUMERIC_DIM,
            Component::Content => NUMERIC_DIM + Component::Type.target_dim(),
            Component::Keyword => {
                NUMERIC_DIM + Component::Type.target_dim() + Component::Content.target_dim()
            }
        }
    }
}

/// A single feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Always one row.
    pub fn shape(&self) -> [usize; 2] {
        [1, self.values.len()]
    }

    pub fn numeric(&self) -> &[f64] {
        &self.values[..NUMERIC_DIM]
    }

    pub fn block(&self, component: Component) -> &[f64] {
        let start = component.offset();
        &self.values[start..start + component.target_dim()]
    }

    /// Narrowing cast used for serialization.
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

/// Fitted transforms plus an embedding model, ready to process posts.
#[derive(Debug)]
pub struct FeatureExtractor {
    transforms: FittedTransforms,
    model: EmbeddingModel,
}

impl FeatureExtractor {
    pub fn new(transforms: FittedTransforms, model: EmbeddingModel) -> Self {
        Self { transforms, model }
    }

    /// Loads the artifacts named by `cfg`, then the embedding model.
    pub fn load(cfg: &FeatureConfig) -> Result<Self, PipelineError> {
        let transforms = timed(Stage::LoadTransforms, || {
            FittedTransforms::load(&cfg.artifacts_dir, &cfg.artifacts)
        })?;
        let model = timed(Stage::LoadModel, || Ok(EmbeddingModel::load(&cfg.embed)?))?;
        Ok(Self::new(transforms, model))
    }

    pub fn transforms(&self) -> &FittedTransforms {
        &self.transforms
    }

    /// Scaled `ln(1 + x)` of score and comment count. Negative counts are rejected.
    pub fn extract_numerical(
        &self,
        score: i64,
        comments: i64,
    ) -> Result<[f64; NUMERIC_DIM], PipelineError> {
        timed(Stage::Numeric, || {
            let score = non_negative("score", score)?;
            let comments = non_negative("comments", comments)?;
            let row = [score.ln_1p(), comments.ln_1p(), 0.0, 0.0];
            let scaled = self.transforms.scaler().transform(&row)?;
            Ok([scaled[0], scaled[1]])
        })
    }

    /// Reduced embedding of `text`, or zeros without touching the model when `text` is empty.
    pub fn extract_embedding(
        &self,
        text: &str,
        component: Component,
    ) -> Result<Vec<f64>, PipelineError> {
        if text.is_empty() {
            debug!(component = component.name(), "empty_field_zero_block");
            return Ok(vec![0.0; component.target_dim()]);
        }
        timed(Stage::Embed(component), || {
            let dense = self.model.embed(text)?;
            let sample: Vec<f64> = dense.iter().map(|&v| f64::from(v)).collect();
            Ok(self.transforms.reducer(component).transform(&sample)?)
        })
    }

    /// Builds the full feature row for one post.
    pub fn process(
        &self,
        score: i64,
        comments: i64,
        summary: &PostSummary,
    ) -> Result<FeatureVector, PipelineError> {
        let mut values = Vec::with_capacity(FEATURE_DIM);
        values.extend(self.extract_numerical(score, comments)?);
        for component in Component::ALL {
            values.extend(self.extract_embedding(summary.field(component), component)?);
        }
        debug_assert_eq!(values.len(), FEATURE_DIM);
        Ok(FeatureVector { values })
    }
}

/// Runs one extraction end to end and folds any failure into the envelope.
pub fn extract_features(
    cfg: &FeatureConfig,
    points: i64,
    comments: i64,
    summary: &Value,
) -> FeatureEnvelope {
    let span = info_span!("extract_features", points, comments);
    let _guard = span.enter();
    let start = Instant::now();

    let result = FeatureExtractor::load(cfg).and_then(|extractor| {
        let summary = PostSummary::from_value(summary)?;
        extractor.process(points, comments, &summary)
    });

    match result {
        Ok(vector) => {
            info!(
                dim = vector.as_slice().len(),
                elapsed_micros = start.elapsed().as_micros(),
                "features_extract_success"
            );
            FeatureEnvelope::from_vector(&vector)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "features_extract_failure"
            );
            FeatureEnvelope::from_error(&err)
        }
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<f64, PipelineError> {
    if value < 0 {
        return Err(PipelineError::NegativeCount { field, value });
    }
    Ok(value as f64)
}
