use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::info;
use ureq::AgentBuilder;

use crate::{EmbedConfig, EmbedError};

const TOKENIZER_FILE: &str = "tokenizer.json";
const HUB_MODEL_FILE: &str = "onnx/model.onnx";
// Large exports keep their weights in a sidecar that must sit next to the graph.
const HUB_MODEL_DATA_FILE: &str = "onnx/model.onnx_data";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModelAssets {
    pub(crate) model_path: PathBuf,
    pub(crate) tokenizer_path: PathBuf,
}

/// Turns `cfg.model_source` into a local model + tokenizer pair, downloading hub ids on demand.
pub(crate) fn resolve_model_assets(cfg: &EmbedConfig) -> Result<ModelAssets, EmbedError> {
    let source = cfg.model_source.trim();
    if source.is_empty() {
        return Err(EmbedError::InvalidConfig("model source is empty".into()));
    }

    let source_path = Path::new(source);
    let mut assets = if source_path.is_dir() {
        local_dir_assets(source_path)?
    } else if source_path.is_file() {
        let tokenizer_path = source_path
            .parent()
            .map(|dir| dir.join(TOKENIZER_FILE))
            .unwrap_or_else(|| PathBuf::from(TOKENIZER_FILE));
        ModelAssets {
            model_path: source_path.to_path_buf(),
            tokenizer_path,
        }
    } else if looks_like_model_id(source) {
        hub_assets(source, cfg)?
    } else {
        return Err(EmbedError::ModelNotFound(source.to_string()));
    };

    if let Some(explicit) = &cfg.tokenizer_path {
        assets.tokenizer_path = explicit.clone();
    }
    if !assets.tokenizer_path.is_file() {
        return Err(EmbedError::TokenizerMissing(
            assets.tokenizer_path.display().to_string(),
        ));
    }

    Ok(assets)
}

fn local_dir_assets(dir: &Path) -> Result<ModelAssets, EmbedError> {
    let model_path = [dir.join("onnx").join("model.onnx"), dir.join("model.onnx")]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| EmbedError::ModelNotFound(dir.display().to_string()))?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path: dir.join(TOKENIZER_FILE),
    })
}

/// Model ids are `owner/name` with no filesystem-looking prefix.
pub(crate) fn looks_like_model_id(source: &str) -> bool {
    let mut parts = source.split('/');
    let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let valid = |part: &str| {
        !part.is_empty()
            && part != "."
            && part != ".."
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    valid(owner) && valid(name)
}

fn hub_assets(model_id: &str, cfg: &EmbedConfig) -> Result<ModelAssets, EmbedError> {
    let base_dir = cfg.cache_dir.join(model_id);
    let model_path = base_dir.join(HUB_MODEL_FILE);
    let tokenizer_path = base_dir.join(TOKENIZER_FILE);

    let fetched_model =
        ensure_local_file(&model_path, &hub_url(cfg, model_id, HUB_MODEL_FILE), cfg, || {
            EmbedError::ModelNotFound(model_id.to_string())
        })?;
    // The sidecar is optional, so only look for it right after fetching the graph. A cached
    // graph without a sidecar must keep working offline.
    let data_path = base_dir.join(HUB_MODEL_DATA_FILE);
    if fetched_model && !data_path.exists() {
        match download_to_path(&data_path, &hub_url(cfg, model_id, HUB_MODEL_DATA_FILE), cfg) {
            Ok(()) | Err(DownloadFailure::NotFound) => {}
            Err(DownloadFailure::Other(err)) => return Err(err),
        }
    }
    ensure_local_file(
        &tokenizer_path,
        &hub_url(cfg, model_id, TOKENIZER_FILE),
        cfg,
        || EmbedError::TokenizerMissing(model_id.to_string()),
    )?;

    Ok(ModelAssets {
        model_path,
        tokenizer_path,
    })
}

fn hub_url(cfg: &EmbedConfig, model_id: &str, file: &str) -> String {
    format!(
        "{}/{}/resolve/main/{}",
        cfg.hub_endpoint.trim_end_matches('/'),
        model_id,
        file
    )
}

/// Downloads `target` unless it already exists. Returns whether a download happened.
/// A 404 maps to `on_missing`.
fn ensure_local_file<F>(
    target: &Path,
    url: &str,
    cfg: &EmbedConfig,
    on_missing: F,
) -> Result<bool, EmbedError>
where
    F: FnOnce() -> EmbedError,
{
    if target.exists() {
        return Ok(false);
    }

    match download_to_path(target, url, cfg) {
        Ok(()) => Ok(true),
        Err(DownloadFailure::NotFound) => Err(on_missing()),
        Err(DownloadFailure::Other(err)) => Err(err),
    }
}

enum DownloadFailure {
    NotFound,
    Other(EmbedError),
}

impl From<io::Error> for DownloadFailure {
    fn from(value: io::Error) -> Self {
        DownloadFailure::Other(EmbedError::Io(value))
    }
}

/// Streams `url` into `target` through a `.part` file so an interrupted run never leaves a
/// truncated model behind.
fn download_to_path(target: &Path, url: &str, cfg: &EmbedConfig) -> Result<(), DownloadFailure> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let response = match download_agent(cfg).get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => return Err(DownloadFailure::NotFound),
        Err(err) => {
            return Err(DownloadFailure::Other(EmbedError::Download(format!(
                "{url}: {err}"
            ))))
        }
    };

    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    if let Err(err) = write_body(response.into_reader(), &partial, target) {
        let _ = fs::remove_file(&partial);
        return Err(DownloadFailure::Other(EmbedError::Download(format!(
            "{url}: {err}"
        ))));
    }

    info!(url, target = %target.display(), "embed_asset_downloaded");
    Ok(())
}

/// Connect and per-read deadlines only: large weight files may take far longer than any
/// fixed whole-transfer limit, but a stalled connection still fails.
fn download_agent(cfg: &EmbedConfig) -> ureq::Agent {
    let mut builder = AgentBuilder::new();
    if let Some(secs) = cfg.download_timeout_secs {
        let stall = Duration::from_secs(secs);
        builder = builder.timeout_connect(stall).timeout_read(stall);
    }
    builder.build()
}

fn write_body(mut reader: impl io::Read, partial: &Path, target: &Path) -> io::Result<()> {
    let mut file = File::create(partial)?;
    io::copy(&mut reader, &mut file)?;
    file.sync_all()?;
    drop(file);
    fs::rename(partial, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_detection() {
        assert!(looks_like_model_id("BAAI/bge-m3"));
        assert!(looks_like_model_id("sentence-transformers/all-MiniLM-L6-v2"));
        assert!(!looks_like_model_id("bge-m3"));
        assert!(!looks_like_model_id("./models/bge-m3"));
        assert!(!looks_like_model_id("/opt/models/bge-m3"));
        assert!(!looks_like_model_id("a/b/c"));
        assert!(!looks_like_model_id("../bge"));
    }

    #[test]
    fn directory_with_onnx_subdir_resolves() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("onnx")).unwrap();
        fs::write(dir.path().join("onnx").join("model.onnx"), b"graph").unwrap();
        fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: dir.path().display().to_string(),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.model_path, dir.path().join("onnx").join("model.onnx"));
        assert_eq!(assets.tokenizer_path, dir.path().join("tokenizer.json"));
    }

    #[test]
    fn flat_directory_resolves() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"graph").unwrap();
        fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: dir.path().display().to_string(),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.model_path, dir.path().join("model.onnx"));
    }

    #[test]
    fn onnx_file_uses_sibling_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("custom.onnx");
        fs::write(&model, b"graph").unwrap();
        fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: model.display().to_string(),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.model_path, model);
        assert_eq!(assets.tokenizer_path, dir.path().join("tokenizer.json"));
    }

    #[test]
    fn directory_without_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EmbedConfig {
            model_source: dir.path().display().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_model_assets(&cfg),
            Err(EmbedError::ModelNotFound(_))
        ));
    }

    #[test]
    fn missing_tokenizer_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"graph").unwrap();

        let cfg = EmbedConfig {
            model_source: dir.path().display().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_model_assets(&cfg),
            Err(EmbedError::TokenizerMissing(_))
        ));
    }

    #[test]
    fn explicit_tokenizer_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"graph").unwrap();
        let tokenizer = dir.path().join("other-tokenizer.json");
        fs::write(&tokenizer, b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: dir.path().display().to_string(),
            tokenizer_path: Some(tokenizer.clone()),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.tokenizer_path, tokenizer);
    }

    #[test]
    fn nonexistent_path_is_not_found() {
        let cfg = EmbedConfig {
            model_source: "./definitely/missing/model.onnx".into(),
            ..Default::default()
        };
        assert!(matches!(
            resolve_model_assets(&cfg),
            Err(EmbedError::ModelNotFound(_))
        ));
    }

    #[test]
    fn cached_hub_assets_skip_download() {
        let cache = tempfile::tempdir().unwrap();
        let base = cache.path().join("BAAI/bge-m3");
        fs::create_dir_all(base.join("onnx")).unwrap();
        fs::write(base.join("onnx").join("model.onnx"), b"graph").unwrap();
        fs::write(base.join("onnx").join("model.onnx_data"), b"weights").unwrap();
        fs::write(base.join("tokenizer.json"), b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: "BAAI/bge-m3".into(),
            cache_dir: cache.path().to_path_buf(),
            // Unroutable endpoint: any download attempt would fail the test.
            hub_endpoint: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.model_path, base.join("onnx").join("model.onnx"));
        assert_eq!(assets.tokenizer_path, base.join("tokenizer.json"));
    }

    #[test]
    fn cached_hub_model_without_sidecar_stays_offline() {
        let cache = tempfile::tempdir().unwrap();
        let base = cache.path().join("org/small-model");
        fs::create_dir_all(base.join("onnx")).unwrap();
        fs::write(base.join("onnx").join("model.onnx"), b"graph").unwrap();
        fs::write(base.join("tokenizer.json"), b"{}").unwrap();

        let cfg = EmbedConfig {
            model_source: "org/small-model".into(),
            cache_dir: cache.path().to_path_buf(),
            hub_endpoint: "http://127.0.0.1:9".into(),
            download_timeout_secs: Some(2),
            ..Default::default()
        };
        let assets = resolve_model_assets(&cfg).unwrap();
        assert_eq!(assets.model_path, base.join("onnx").join("model.onnx"));
        assert!(!base.join("onnx").join("model.onnx_data").exists());
    }

    #[test]
    fn truncated_download_leaves_no_partial_file() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("onnx").join("model.onnx");
        let cfg = EmbedConfig {
            download_timeout_secs: Some(5),
            ..Default::default()
        };
        let result = download_to_path(&target, &format!("http://{addr}/model.onnx"), &cfg);
        server.join().unwrap();

        assert!(matches!(
            result,
            Err(DownloadFailure::Other(EmbedError::Download(_)))
        ));
        assert!(!target.exists());
        assert!(!dir.path().join("onnx").join("model.onnx.part").exists());
    }

    #[test]
    fn hub_url_joins_cleanly() {
        let cfg = EmbedConfig {
            hub_endpoint: "https://huggingface.co/".into(),
            ..Default::default()
        };
        assert_eq!(
            hub_url(&cfg, "BAAI/bge-m3", "tokenizer.json"),
            "https://huggingface.co/BAAI/bge-m3/resolve/main/tokenizer.json"
        );
    }
}
