use std::path::Path;

use transforms::{load_pca, load_scaler, PcaReducer, Scaler};

use crate::config::ArtifactFiles;
use crate::error::PipelineError;
use crate::pipeline::{Component, SCALER_INPUT_DIM};

/// The fitted scaler and the three reducers, checked against the feature layout.
#[derive(Debug, Clone)]
pub struct FittedTransforms {
    scaler: Scaler,
    type_reducer: PcaReducer,
    content_reducer: PcaReducer,
    keyword_reducer: PcaReducer,
}

impl FittedTransforms {
    /// Reads all four artifacts from `dir`.
    pub fn load(dir: &Path, files: &ArtifactFiles) -> Result<Self, PipelineError> {
        let type_reducer = load_pca(&dir.join(&files.type_pca))?;
        let content_reducer = load_pca(&dir.join(&files.content_pca))?;
        let keyword_reducer = load_pca(&dir.join(&files.keyword_pca))?;
        let scaler = load_scaler(&dir.join(&files.scaler))?;
        Self::from_parts(scaler, type_reducer, content_reducer, keyword_reducer)
    }

    /// Rejects a scaler that does not take [`SCALER_INPUT_DIM`] columns, or a reducer whose
    /// output width is not its component's [`target_dim`](Component::target_dim).
    pub fn from_parts(
        scaler: Scaler,
        type_reducer: PcaReducer,
        content_reducer: PcaReducer,
        keyword_reducer: PcaReducer,
    ) -> Result<Self, PipelineError> {
        if scaler.n_features() != SCALER_INPUT_DIM {
            return Err(PipelineError::ScalerWidth {
                expected: SCALER_INPUT_DIM,
                actual: scaler.n_features(),
            });
        }
        let transforms = Self {
            scaler,
            type_reducer,
            content_reducer,
            keyword_reducer,
        };
        for component in Component::ALL {
            let actual = transforms.reducer(component).n_components();
            if actual != component.target_dim() {
                return Err(PipelineError::ReducerWidth {
                    component: component.name(),
                    expected: component.target_dim(),
                    actual,
                });
            }
        }
        Ok(transforms)
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn reducer(&self, component: Component) -> &PcaReducer {
        match component {
            Component::Type => &self.type_reducer,
            Component::Content => &self.content_reducer,
            Component::Keyword => &self.keyword_reducer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transforms::{PcaArtifact, ScalerArtifact};

    fn reducer(n_components: usize, n_features: usize) -> PcaReducer {
        PcaReducer::from_artifact(PcaArtifact {
            components: vec![vec![0.5; n_features]; n_components],
            mean: None,
            explained_variance: None,
            whiten: false,
        })
        .unwrap()
    }

    fn scaler(width: usize) -> Scaler {
        Scaler::from_artifact(ScalerArtifact::Standard {
            mean: Some(vec![0.0; width]),
            scale: Some(vec![1.0; width]),
        })
        .unwrap()
    }

    #[test]
    fn accepts_matching_widths() {
        let fitted =
            FittedTransforms::from_parts(scaler(4), reducer(64, 8), reducer(64, 8), reducer(128, 8))
                .unwrap();
        assert_eq!(fitted.reducer(Component::Keyword).n_components(), 128);
        assert_eq!(fitted.scaler().n_features(), 4);
    }

    #[test]
    fn rejects_wrong_scaler_width() {
        let err =
            FittedTransforms::from_parts(scaler(2), reducer(64, 8), reducer(64, 8), reducer(128, 8))
                .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ScalerWidth {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn rejects_wrong_reducer_width() {
        let err =
            FittedTransforms::from_parts(scaler(4), reducer(64, 8), reducer(32, 8), reducer(128, 8))
                .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ReducerWidth {
                component: "content",
                expected: 64,
                actual: 32
            }
        ));
    }

    #[test]
    fn missing_directory_reports_the_file() {
        let err = FittedTransforms::load(Path::new("/no/such/dir"), &ArtifactFiles::default())
            .unwrap_err();
        assert!(err.to_string().contains("type_pca.json"), "{err}");
    }
}
