//! Startup shared by the `vetrag` binaries: logging, config and service build.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vetrag_core::config::{Config, Settings};
use vetrag_core::records::Corpora;
use vetrag_embed::default_embedder;
use vetrag_hybrid::{RankParams, RetrievalService};
use vetrag_vector::EmbeddingCache;

pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Loads and validates settings from `config_dir`.
pub fn load_settings(config_dir: &Path) -> Result<Settings> {
    let config = Config::load_from(config_dir).context("Error loading config")?;
    tracing::debug!(env = config.env_name(), dir = %config_dir.display(), "config loaded");
    config.settings()
}

/// Loads the corpora, the encoder and the embedding cache, then builds every
/// domain index. Blocks until all three are ready.
pub fn build_service(settings: &Settings) -> Result<RetrievalService> {
    let corpora = Corpora::load(&settings.data)?;
    let embedder = default_embedder(&settings.embedding)?;
    let params = RankParams::from(&settings.retrieval);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let cache = match EmbeddingCache::open(&settings.data.cache_dir).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(dir = %settings.data.cache_dir.display(), error = %e, "embedding cache unavailable");
                None
            }
        };
        RetrievalService::build(corpora, embedder, cache.as_ref(), params).await
    })
}
