//! Fitted transforms applied to post features.
//!
//! Two kinds of read-only artifacts, both stored as JSON:
//!
//! - [`PcaReducer`] - a principal-component projection that shrinks a dense embedding to a
//!   fixed number of components.
//! - [`Scaler`] - a per-column standard or min-max scaler for numeric inputs.
//!
//! Artifacts are validated when loaded (rectangular matrices, matching widths, finite values),
//! so `transform` only has to check the width of the sample it is given.
//!
//! ```
//! use transforms::{PcaArtifact, PcaReducer};
//!
//! let pca = PcaReducer::from_artifact(PcaArtifact {
//!     components: vec![vec![1.0, 1.0]],
//!     mean: None,
//!     explained_variance: None,
//!     whiten: false,
//! })
//! .unwrap();
//! assert_eq!(pca.transform(&[2.0, 3.0]).unwrap(), vec![5.0]);
//! ```

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::info;

mod error;
mod pca;
mod scaler;

pub use crate::error::TransformError;
pub use crate::pca::{PcaArtifact, PcaReducer};
pub use crate::scaler::{Scaler, ScalerArtifact};

/// Loads and validates a PCA projection from a JSON artifact.
pub fn load_pca(path: &Path) -> Result<PcaReducer, TransformError> {
    let start = Instant::now();
    let reducer = PcaReducer::from_artifact(read_json(path)?)?;
    info!(
        path = %path.display(),
        n_features = reducer.n_features(),
        n_components = reducer.n_components(),
        elapsed_micros = start.elapsed().as_micros(),
        "transform_loaded"
    );
    Ok(reducer)
}

/// Loads and validates a scaler from a JSON artifact.
pub fn load_scaler(path: &Path) -> Result<Scaler, TransformError> {
    let start = Instant::now();
    let scaler = Scaler::from_artifact(read_json(path)?)?;
    info!(
        path = %path.display(),
        n_features = scaler.n_features(),
        elapsed_micros = start.elapsed().as_micros(),
        "transform_loaded"
    );
    Ok(scaler)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TransformError> {
    let raw = fs::read_to_string(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| TransformError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_finite(what: &str, values: &[f64]) -> Result<(), TransformError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(TransformError::Invalid(format!(
            "{what} has a non-finite value at index {idx}"
        ))),
        None => Ok(()),
    }
}
