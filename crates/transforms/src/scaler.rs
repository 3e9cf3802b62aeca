use serde::{Deserialize, Serialize};

use crate::{ensure_finite, TransformError};

/// On-disk form of a fitted scaler, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`. Either side may be absent (no centering / no scaling).
    Standard {
        #[serde(default, alias = "mean_")]
        mean: Option<Vec<f64>>,
        #[serde(default, alias = "scale_")]
        scale: Option<Vec<f64>>,
    },
    /// `x * scale + min`.
    MinMax {
        #[serde(alias = "scale_")]
        scale: Vec<f64>,
        #[serde(alias = "min_")]
        min: Vec<f64>,
    },
}

/// A validated, read-only scaler.
#[derive(Debug, Clone, PartialEq)]
pub enum Scaler {
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { scale: Vec<f64>, min: Vec<f64> },
}

impl Scaler {
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, TransformError> {
        let scaler = match artifact {
            ScalerArtifact::Standard { mean, scale } => {
                let width = match (&mean, &scale) {
                    (Some(m), Some(s)) if m.len() != s.len() => {
                        return Err(TransformError::DimensionMismatch {
                            context: "standard scaler scale",
                            expected: m.len(),
                            actual: s.len(),
                        })
                    }
                    (Some(m), _) => m.len(),
                    (None, Some(s)) => s.len(),
                    (None, None) => {
                        return Err(TransformError::Invalid(
                            "standard scaler needs mean or scale".into(),
                        ))
                    }
                };
                let mean = mean.unwrap_or_else(|| vec![0.0; width]);
                // Constant columns were fit with zero variance; leave them unscaled.
                let scale: Vec<f64> = scale
                    .unwrap_or_else(|| vec![1.0; width])
                    .into_iter()
                    .map(|s| if s == 0.0 { 1.0 } else { s })
                    .collect();
                ensure_finite("standard scaler mean", &mean)?;
                ensure_finite("standard scaler scale", &scale)?;
                Scaler::Standard { mean, scale }
            }
            ScalerArtifact::MinMax { scale, min } => {
                if scale.len() != min.len() {
                    return Err(TransformError::DimensionMismatch {
                        context: "min-max scaler min",
                        expected: scale.len(),
                        actual: min.len(),
                    });
                }
                ensure_finite("min-max scaler scale", &scale)?;
                ensure_finite("min-max scaler min", &min)?;
                Scaler::MinMax { scale, min }
            }
        };

        if scaler.n_features() == 0 {
            return Err(TransformError::Invalid("scaler has zero columns".into()));
        }
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Scales one sample column-wise.
    pub fn transform(&self, sample: &[f64]) -> Result<Vec<f64>, TransformError> {
        if sample.len() != self.n_features() {
            return Err(TransformError::DimensionMismatch {
                context: "scaler input",
                expected: self.n_features(),
                actual: sample.len(),
            });
        }
        let scaled = match self {
            Scaler::Standard { mean, scale } => sample
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            Scaler::MinMax { scale, min } => sample
                .iter()
                .zip(scale.iter().zip(min))
                .map(|(x, (s, m))| x * s + m)
                .collect(),
        };
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_centers_and_scales() {
        let scaler = Scaler::from_artifact(ScalerArtifact::Standard {
            mean: Some(vec![1.0, 2.0]),
            scale: Some(vec![2.0, 4.0]),
        })
        .unwrap();
        assert_eq!(scaler.transform(&[3.0, 10.0]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn zero_scale_leaves_column_unscaled() {
        let scaler = Scaler::from_artifact(ScalerArtifact::Standard {
            mean: Some(vec![0.0, 5.0]),
            scale: Some(vec![1.0, 0.0]),
        })
        .unwrap();
        assert_eq!(scaler.transform(&[0.0, 7.0]).unwrap(), vec![0.0, 2.0]);
    }

    #[test]
    fn min_max_scaler_is_affine() {
        let scaler = Scaler::from_artifact(ScalerArtifact::MinMax {
            scale: vec![0.5, 2.0],
            min: vec![-1.0, 0.0],
        })
        .unwrap();
        assert_eq!(scaler.transform(&[4.0, 1.5]).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn tagged_json_parses() {
        let json = r#"{"kind":"standard","mean_":[0.0,0.0,0.0,0.0],"scale_":[1.0,1.0,1.0,1.0]}"#;
        let scaler = Scaler::from_artifact(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(scaler.n_features(), 4);

        let json = r#"{"kind":"min_max","scale":[1.0],"min":[0.0]}"#;
        let scaler = Scaler::from_artifact(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(scaler.n_features(), 1);
    }

    #[test]
    fn mismatched_widths_are_rejected() {
        let result = Scaler::from_artifact(ScalerArtifact::Standard {
            mean: Some(vec![0.0; 4]),
            scale: Some(vec![1.0; 3]),
        });
        assert!(matches!(
            result,
            Err(TransformError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_standard_scaler_is_rejected() {
        let result = Scaler::from_artifact(ScalerArtifact::Standard {
            mean: None,
            scale: None,
        });
        assert!(matches!(result, Err(TransformError::Invalid(_))));
    }

    #[test]
    fn wrong_sample_width_is_rejected() {
        let scaler = Scaler::from_artifact(ScalerArtifact::MinMax {
            scale: vec![1.0; 4],
            min: vec![0.0; 4],
        })
        .unwrap();
        assert!(scaler.transform(&[1.0, 2.0]).is_err());
    }
}
