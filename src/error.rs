use embed::EmbedError;
use thiserror::Error;
use transforms::TransformError;

use crate::config::ConfigLoadError;

/// Everything that can go wrong while turning one post into a feature vector.
///
/// Only the `Display` text leaves the process (inside the error envelope), so messages name the
/// offending file, field or width.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("malformed summary: {0}")]
    MalformedSummary(String),

    #[error("{field} must be non-negative, got {value}")]
    NegativeCount { field: &'static str, value: i64 },

    #[error("{component} reducer produces {actual} components, expected {expected}")]
    ReducerWidth {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("scaler takes {actual} input columns, expected {expected}")]
    ScalerWidth { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_variants_keep_inner_message() {
        let err: PipelineError = EmbedError::ModelNotFound("BAAI/bge-m3".into()).into();
        assert_eq!(err.to_string(), "model file not found: BAAI/bge-m3");
    }

    #[test]
    fn width_messages_name_the_component() {
        let err = PipelineError::ReducerWidth {
            component: "keyword",
            expected: 128,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "keyword reducer produces 64 components, expected 128"
        );
    }

    #[test]
    fn negative_count_message() {
        let err = PipelineError::NegativeCount {
            field: "points",
            value: -3,
        };
        assert_eq!(err.to_string(), "points must be non-negative, got -3");
    }
}
