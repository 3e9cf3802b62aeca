use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{ensure_finite, TransformError};

/// On-disk form of a fitted principal-component projection.
///
/// Field names follow the fitted attributes of the usual Python tooling; the trailing-underscore
/// spellings are accepted too so an exported attribute dict can be dumped as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PcaArtifact {
    /// `n_components` rows of `n_features` values each.
    #[serde(alias = "components_")]
    pub components: Vec<Vec<f64>>,
    /// Per-feature mean removed before projecting. Absent means zero.
    #[serde(default, alias = "mean_")]
    pub mean: Option<Vec<f64>>,
    #[serde(default, alias = "explained_variance_")]
    pub explained_variance: Option<Vec<f64>>,
    /// Divide each projected component by `sqrt(explained_variance)`.
    #[serde(default)]
    pub whiten: bool,
}

/// A validated, read-only PCA projection.
#[derive(Debug, Clone)]
pub struct PcaReducer {
    components: Array2<f64>,
    mean: Array1<f64>,
    whiten_scale: Option<Array1<f64>>,
}

impl PcaReducer {
    pub fn from_artifact(artifact: PcaArtifact) -> Result<Self, TransformError> {
        let n_components = artifact.components.len();
        let n_features = artifact.components.first().map(Vec::len).unwrap_or(0);
        if n_components == 0 || n_features == 0 {
            return Err(TransformError::Invalid("pca components are empty".into()));
        }

        let mut flat = Vec::with_capacity(n_components * n_features);
        for (row_idx, row) in artifact.components.into_iter().enumerate() {
            if row.len() != n_features {
                return Err(TransformError::Invalid(format!(
                    "pca component row {row_idx} has {} values, expected {n_features}",
                    row.len()
                )));
            }
            flat.extend(row);
        }
        ensure_finite("pca components", &flat)?;
        let components = Array2::from_shape_vec((n_components, n_features), flat)
            .map_err(|e| TransformError::Invalid(e.to_string()))?;

        let mean = match artifact.mean {
            Some(mean) => {
                if mean.len() != n_features {
                    return Err(TransformError::DimensionMismatch {
                        context: "pca mean",
                        expected: n_features,
                        actual: mean.len(),
                    });
                }
                ensure_finite("pca mean", &mean)?;
                Array1::from(mean)
            }
            None => Array1::zeros(n_features),
        };

        let whiten_scale = if artifact.whiten {
            let variance = artifact.explained_variance.ok_or_else(|| {
                TransformError::Invalid("whiten requires explained_variance".into())
            })?;
            if variance.len() != n_components {
                return Err(TransformError::DimensionMismatch {
                    context: "pca explained_variance",
                    expected: n_components,
                    actual: variance.len(),
                });
            }
            if variance.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(TransformError::Invalid(
                    "explained_variance must be finite and positive when whitening".into(),
                ));
            }
            Some(variance.iter().map(|v| v.sqrt()).collect())
        } else {
            None
        };

        Ok(Self {
            components,
            mean,
            whiten_scale,
        })
    }

    /// Input width (embedding dimensionality the projection was fit on).
    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    /// Output width.
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Projects one sample: `(x - mean) · componentsᵀ`, optionally whitened.
    pub fn transform(&self, sample: &[f64]) -> Result<Vec<f64>, TransformError> {
        if sample.len() != self.n_features() {
            return Err(TransformError::DimensionMismatch {
                context: "pca input",
                expected: self.n_features(),
                actual: sample.len(),
            });
        }

        let centered = &ArrayView1::from(sample) - &self.mean;
        let mut projected = self.components.dot(&centered);
        if let Some(scale) = &self.whiten_scale {
            projected /= scale;
        }
        Ok(projected.to_vec())
    }
}
