//! Layered configuration for the feature extractor.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `hnfeat.{toml,yaml,json}` in the working directory, or the file passed with `--config`
//! 3. `HNFEAT__*` environment variables (`HNFEAT__EMBED__MODE=stub`,
//!    `HNFEAT__ARTIFACTS_DIR=/opt/hn/models`, ...)
//! 4. `BGE_M3_PATH`, which always wins for the embedding model location
//!
//! ```toml
//! artifacts_dir = "/opt/hn/models"
//! log_level = "info"
//!
//! [artifacts]
//! keyword_pca = "keyword_pca_v2.json"
//!
//! [embed]
//! model_source = "/opt/hn/models/bge-m3"
//! max_sequence_length = 512
//! ```

use std::path::{Path, PathBuf};

use embed::EmbedConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base name of the optional config file looked up in the working directory.
pub const CONFIG_FILE_STEM: &str = "hnfeat";
/// Prefix of the environment overrides; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "HNFEAT";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("validation error: {0}")]
    Validation(String),
}

/// File names of the four fitted artifacts, relative to [`FeatureConfig::artifacts_dir`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactFiles {
    #[serde(default = "default_type_pca")]
    pub type_pca: PathBuf,
    #[serde(default = "default_content_pca")]
    pub content_pca: PathBuf,
    #[serde(default = "default_keyword_pca")]
    pub keyword_pca: PathBuf,
    #[serde(default = "default_scaler")]
    pub scaler: PathBuf,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            type_pca: default_type_pca(),
            content_pca: default_content_pca(),
            keyword_pca: default_keyword_pca(),
            scaler: default_scaler(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// Directory holding the fitted artifacts.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[serde(default)]
    pub artifacts: ArtifactFiles,

    #[serde(default)]
    pub embed: EmbedConfig,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of the compact text format.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            artifacts: ArtifactFiles::default(),
            embed: EmbedConfig::default(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl FeatureConfig {
    /// Load from the optional config file and the environment.
    ///
    /// An explicit `path` must exist; the default `hnfeat.*` lookup is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE_STEM).required(false),
        };
        let builder = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: FeatureConfig = builder.build()?.try_deserialize()?;
        cfg.embed = cfg.embed.with_env_source();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let names = [
            ("type_pca", &self.artifacts.type_pca),
            ("content_pca", &self.artifacts.content_pca),
            ("keyword_pca", &self.artifacts.keyword_pca),
            ("scaler", &self.artifacts.scaler),
        ];
        for (key, name) in names {
            if name.as_os_str().is_empty() {
                return Err(ConfigLoadError::Validation(format!(
                    "artifacts.{key} must not be empty"
                )));
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_artifacts_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_type_pca() -> PathBuf {
    PathBuf::from("type_pca.json")
}

fn default_content_pca() -> PathBuf {
    PathBuf::from("content_pca.json")
}

fn default_keyword_pca() -> PathBuf {
    PathBuf::from("keyword_pca.json")
}

fn default_scaler() -> PathBuf {
    PathBuf::from("scaler.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}
