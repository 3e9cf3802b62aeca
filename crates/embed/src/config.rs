use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that selects where the embedding model comes from.
pub const MODEL_SOURCE_ENV: &str = "BGE_M3_PATH";

/// Model used when neither config nor [`MODEL_SOURCE_ENV`] name one.
pub const DEFAULT_MODEL_SOURCE: &str = "BAAI/bge-m3";

/// Runtime configuration describing which model/tokenizer to use and how to post-process vectors.
///
/// # Example
/// ```no_run
/// use embed::{EmbedConfig, EmbeddingModel};
///
/// let cfg = EmbedConfig {
///     model_source: "./models/bge-m3".into(),
///     ..Default::default()
/// };
///
/// let model = EmbeddingModel::load(&cfg).unwrap();
/// let _vector = model.embed("Show HN: a tiny database").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedConfig {
    /// Inference mode selector: `"onnx"` (local model) or `"stub"` (deterministic, offline).
    /// `"fast"` is accepted as an alias of `"stub"`.
    pub mode: String,
    /// Where the model lives. One of:
    /// - a directory holding `onnx/model.onnx` (or `model.onnx`) and `tokenizer.json`
    /// - a path to a `.onnx` file with `tokenizer.json` next to it
    /// - a Hugging Face model id such as `BAAI/bge-m3`, fetched into [`cache_dir`](Self::cache_dir)
    pub model_source: String,
    /// Explicit `tokenizer.json` location. Overrides whatever the source resolution finds.
    pub tokenizer_path: Option<PathBuf>,
    /// Base URL used for model ids.
    pub hub_endpoint: String,
    /// Download target for model ids.
    pub cache_dir: PathBuf,
    /// Token budget per text; longer inputs are truncated by the tokenizer.
    pub max_sequence_length: usize,
    /// Normalize the resulting vector to unit length.
    pub normalize: bool,
    /// Width of stub vectors. Must match the fitted reducers' input width when stub mode is used.
    pub stub_dim: usize,
    /// Connect and per-read stall timeout for asset downloads, in seconds. There is no limit on
    /// the whole transfer. `None` disables both.
    pub download_timeout_secs: Option<u64>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_source: DEFAULT_MODEL_SOURCE.into(),
            tokenizer_path: None,
            hub_endpoint: "https://huggingface.co".into(),
            cache_dir: default_cache_dir(),
            max_sequence_length: 8192,
            normalize: true,
            stub_dim: 1024,
            download_timeout_secs: Some(60),
        }
    }
}

impl EmbedConfig {
    /// Replaces [`model_source`](Self::model_source) with `BGE_M3_PATH` when that variable is set
    /// and non-empty.
    pub fn with_env_source(mut self) -> Self {
        if let Ok(source) = std::env::var(MODEL_SOURCE_ENV) {
            if !source.trim().is_empty() {
                self.model_source = source;
            }
        }
        self
    }

    pub(crate) fn is_stub(&self) -> bool {
        matches!(self.mode.as_str(), "stub" | "fast")
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("hnfeat").join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
}
