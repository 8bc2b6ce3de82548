//! vetrag-embed
//!
//! Sentence encoders behind the `Embedder` trait: a candle BERT model for real
//! runs and a hashing embedder for tests and model-less environments.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use vetrag_core::config::EmbeddingSettings;
use vetrag_core::traits::Embedder;

pub mod bert;
pub mod device;
pub mod hashing;
pub mod pool;
pub mod tokenize;

pub use bert::BertEmbedder;
pub use hashing::HashingEmbedder;
pub use pool::masked_mean_l2;

/// Directory name of the bundled encoder checkpoint.
pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Picks the encoder for a run.
///
/// `embedding.use_fake` or `APP_USE_FAKE_EMBEDDINGS=1|true` selects the
/// hashing embedder; otherwise the BERT checkpoint is loaded from
/// [`resolve_model_dir`].
pub fn default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let env_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if settings.use_fake || env_fake {
        tracing::info!(dim = settings.fake_dim, "using hashing embedder");
        return Ok(Arc::new(HashingEmbedder::new(settings.fake_dim)));
    }
    let dir = resolve_model_dir(settings.model_dir.as_deref())?;
    Ok(Arc::new(BertEmbedder::load(&dir, settings.max_len)?))
}

/// First existing directory among: the configured one, `APP_MODEL_DIR`,
/// `MODEL_DIR`, `models/all-MiniLM-L6-v2`, `../models/all-MiniLM-L6-v2`.
pub fn resolve_model_dir(configured: Option<&Path>) -> Result<PathBuf> {
    let mut candidates: Vec<(&str, PathBuf)> = Vec::new();
    if let Some(dir) = configured {
        candidates.push(("embedding.model_dir", dir.to_path_buf()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            candidates.push((var, PathBuf::from(dir)));
        }
    }
    candidates.push(("default", Path::new("models").join(DEFAULT_MODEL_NAME)));
    candidates.push(("default", Path::new("../models").join(DEFAULT_MODEL_NAME)));

    for (source, path) in candidates {
        if path.exists() {
            tracing::info!(source, dir = %path.display(), "using model dir");
            return Ok(path);
        }
    }
    Err(anyhow!("Could not locate the {DEFAULT_MODEL_NAME} model directory"))
}
