use std::fmt::Display;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::pipeline::FeatureVector;

/// `dtype` tag of a successful feature envelope.
pub const DTYPE_FLOAT32: &str = "float32";

/// The single JSON object `extract_features` prints.
///
/// `binary` is the base64 of the row's `f32` values in native byte order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureEnvelope {
    Features {
        binary: String,
        shape: [usize; 2],
        dtype: String,
    },
    Error {
        error: String,
    },
}

impl FeatureEnvelope {
    pub fn from_vector(vector: &FeatureVector) -> Self {
        let values = vector.to_f32();
        FeatureEnvelope::Features {
            binary: STANDARD.encode(bytemuck::cast_slice::<f32, u8>(&values)),
            shape: vector.shape(),
            dtype: DTYPE_FLOAT32.to_string(),
        }
    }

    pub fn from_error(err: &impl Display) -> Self {
        FeatureEnvelope::Error {
            error: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FeatureEnvelope::Error { .. })
    }

    /// Decodes `binary` back into values. `None` for error envelopes, bad base64, or a byte
    /// count that does not match `shape`.
    pub fn decode(&self) -> Option<Vec<f32>> {
        let FeatureEnvelope::Features { binary, shape, .. } = self else {
            return None;
        };
        let expected = shape[0]
            .checked_mul(shape[1])?
            .checked_mul(std::mem::size_of::<f32>())?;
        let bytes = STANDARD.decode(binary).ok()?;
        if bytes.len() != expected {
            return None;
        }
        Some(
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }
}

/// The single JSON object `parse_pdf` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfEnvelope {
    pub result: String,
}
