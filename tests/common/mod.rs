#![allow(dead_code)]

use std::fs;
use std::path::Path;

use hnfeat::{EmbedConfig, FeatureConfig};
use serde_json::json;

/// Width of stub embeddings used by every offline test.
pub const EMBED_DIM: usize = 8;

pub const SCALER_MEAN: [f64; 4] = [1.0, 0.5, 0.0, 0.0];
pub const SCALER_SCALE: [f64; 4] = [2.0, 4.0, 1.0, 1.0];

/// Rows of a `n_components x EMBED_DIM` projection with a little structure in it.
fn components(n_components: usize, seed: f64) -> Vec<Vec<f64>> {
    (0..n_components)
        .map(|row| {
            (0..EMBED_DIM)
                .map(|col| ((row * EMBED_DIM + col) as f64 * 0.37 + seed).sin())
                .collect()
        })
        .collect()
}

fn write_pca(dir: &Path, name: &str, n_components: usize, seed: f64) {
    let artifact = json!({
        "components": components(n_components, seed),
        "mean": vec![0.01; EMBED_DIM],
    });
    fs::write(dir.join(name), artifact.to_string()).unwrap();
}

/// Writes the four artifacts under their default names. `keyword_width` lets tests break the
/// keyword reducer on purpose.
pub fn write_artifacts_with(dir: &Path, keyword_width: usize) {
    write_pca(dir, "type_pca.json", 64, 0.1);
    write_pca(dir, "content_pca.json", 64, 0.2);
    write_pca(dir, "keyword_pca.json", keyword_width, 0.3);
    let scaler = json!({
        "kind": "standard",
        "mean": SCALER_MEAN,
        "scale": SCALER_SCALE,
    });
    fs::write(dir.join("scaler.json"), scaler.to_string()).unwrap();
}

pub fn write_artifacts(dir: &Path) {
    write_artifacts_with(dir, 128);
}

/// Config reading artifacts from `dir` with offline stub embeddings.
pub fn stub_config(dir: &Path) -> FeatureConfig {
    FeatureConfig {
        artifacts_dir: dir.to_path_buf(),
        embed: EmbedConfig {
            mode: "stub".into(),
            stub_dim: EMBED_DIM,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// What the numeric block should hold for the given counts.
pub fn expected_numeric(points: i64, comments: i64) -> [f64; 2] {
    [
        ((points as f64).ln_1p() - SCALER_MEAN[0]) / SCALER_SCALE[0],
        ((comments as f64).ln_1p() - SCALER_MEAN[1]) / SCALER_SCALE[1],
    ]
}
