//! Dense text embeddings for post feature extraction.
//!
//! Turns a short text (an article type, a content summary, a keyword list) into a dense vector
//! with a pretrained embedding model. Two backends:
//!
//! - **ONNX** - a local transformer export (BGE-M3 by default) run through ONNX Runtime, with a
//!   Hugging Face `tokenizer.json`. Model ids are fetched into a cache directory on first use.
//! - **Stub** - deterministic hash-derived vectors. No model files, used for offline tests and
//!   smoke runs.
//!
//! Unlike a search service there is no silent fallback: asking for ONNX and not finding the model
//! is an error, because the downstream fitted reducers only make sense on real model output.
//!
//! ## Quick example
//!
//! ```
//! use embed::{EmbedConfig, EmbeddingModel};
//!
//! let cfg = EmbedConfig {
//!     mode: "stub".into(),
//!     stub_dim: 8,
//!     ..Default::default()
//! };
//! let model = EmbeddingModel::load(&cfg).unwrap();
//! assert_eq!(model.embed("rust compilers").unwrap().len(), 8);
//! ```

pub mod config;
pub mod error;

mod assets;
mod normalize;
mod onnx;
mod stub;

use std::time::Instant;

use tracing::{debug, info, warn};

pub use crate::config::{EmbedConfig, DEFAULT_MODEL_SOURCE, MODEL_SOURCE_ENV};
pub use crate::error::EmbedError;
pub use crate::onnx::OnnxEmbedder;

use crate::assets::resolve_model_assets;
use crate::normalize::l2_normalize_in_place;
use crate::stub::make_stub_vector;

/// A loaded embedding backend. Load once, call [`embed`](Self::embed) per text.
#[derive(Debug)]
pub enum EmbeddingModel {
    Onnx {
        embedder: OnnxEmbedder,
        normalize: bool,
    },
    Stub {
        dim: usize,
        normalize: bool,
    },
}

impl EmbeddingModel {
    /// Resolves assets and builds the backend selected by `cfg.mode`.
    pub fn load(cfg: &EmbedConfig) -> Result<Self, EmbedError> {
        let start = Instant::now();

        if cfg.is_stub() {
            if cfg.stub_dim == 0 {
                return Err(EmbedError::InvalidConfig("stub_dim must be > 0".into()));
            }
            info!(mode = "stub", dim = cfg.stub_dim, "embed_model_ready");
            return Ok(EmbeddingModel::Stub {
                dim: cfg.stub_dim,
                normalize: cfg.normalize,
            });
        }

        if cfg.mode != "onnx" {
            return Err(EmbedError::InvalidConfig(format!(
                "unknown embedding mode '{}'",
                cfg.mode
            )));
        }
        if cfg.max_sequence_length == 0 {
            return Err(EmbedError::InvalidConfig(
                "max_sequence_length must be > 0".into(),
            ));
        }

        let loaded = resolve_model_assets(cfg)
            .and_then(|assets| OnnxEmbedder::load(&assets, cfg.max_sequence_length));
        match loaded {
            Ok(embedder) => {
                info!(
                    mode = "onnx",
                    source = %cfg.model_source,
                    elapsed_micros = start.elapsed().as_micros(),
                    "embed_model_ready"
                );
                Ok(EmbeddingModel::Onnx {
                    embedder,
                    normalize: cfg.normalize,
                })
            }
            Err(err) => {
                warn!(
                    source = %cfg.model_source,
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "embed_model_load_failure"
                );
                Err(err)
            }
        }
    }

    /// Embeds one text. The caller decides what to do with empty input.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let start = Instant::now();
        let vector = match self {
            EmbeddingModel::Stub { dim, normalize } => make_stub_vector(text, *dim, *normalize),
            EmbeddingModel::Onnx {
                embedder,
                normalize,
            } => {
                let mut vector = embedder.embed(text)?;
                if *normalize {
                    l2_normalize_in_place(&mut vector);
                }
                vector
            }
        };
        debug!(
            backend = self.backend_name(),
            text_len = text.len(),
            dim = vector.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "embed_text"
        );
        Ok(vector)
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            EmbeddingModel::Onnx { .. } => "onnx",
            EmbeddingModel::Stub { .. } => "stub",
        }
    }
}
