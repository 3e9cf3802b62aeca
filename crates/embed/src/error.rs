use std::io;
use thiserror::Error;

/// Errors surfaced while loading or running the embedding model.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The ONNX model could not be located locally or fetched from the hub.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing next to the model.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (unknown mode, zero stub width, ...).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime or tokenizer errors.
    #[error("inference failure: {0}")]
    Inference(String),
}
