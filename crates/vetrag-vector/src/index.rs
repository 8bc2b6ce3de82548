use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use vetrag_core::traits::Embedder;
use vetrag_core::{DocId, Error};

use crate::cache::{CacheLookup, EmbeddingCache};
use crate::flat::FlatL2Index;

const EMBED_BATCH: usize = 32;

/// One build at a time per cache key.
#[derive(Default)]
pub struct BuildLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl BuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, cache_key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(cache_key.to_string()).or_default().clone()
    }
}

/// Read-only nearest-neighbour index over one domain corpus.
pub struct VectorIndex {
    cache_key: String,
    flat: FlatL2Index,
}

impl VectorIndex {
    /// Embeds `documents` (or reuses a matching cache entry) and indexes them
    /// under their positions.
    pub async fn build(
        documents: &[String],
        cache_key: &str,
        embedder: &dyn Embedder,
        cache: Option<&EmbeddingCache>,
        locks: &BuildLocks,
    ) -> Result<Self> {
        let dim = embedder.dim();
        if documents.is_empty() {
            tracing::warn!(cache_key, "empty corpus, index will return no results");
            return Ok(Self { cache_key: cache_key.to_string(), flat: FlatL2Index::new(dim) });
        }

        let lock = locks.lock_for(cache_key);
        let _guard = lock.lock().await;
        let start = Instant::now();

        let cached = match cache {
            Some(c) => match c.load(cache_key, embedder.embedder_id(), dim, documents).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    tracing::warn!(cache_key, error = %e, "embedding cache unreadable, rebuilding");
                    CacheLookup::Mismatch(e.to_string())
                }
            },
            None => CacheLookup::Absent,
        };

        let vectors = match cached {
            CacheLookup::Hit(vectors) => {
                tracing::info!(cache_key, docs = vectors.len(), "loaded embeddings from cache");
                vectors
            }
            miss => {
                if let CacheLookup::Mismatch(reason) = &miss {
                    tracing::info!(cache_key, %reason, "embedding cache stale, rebuilding");
                }
                let vectors = embed_all(documents, cache_key, embedder)?;
                if let Some(c) = cache {
                    if let Err(e) = c.store(cache_key, embedder.embedder_id(), dim, documents, &vectors).await {
                        tracing::warn!(cache_key, error = %e, "could not persist embeddings");
                    }
                }
                vectors
            }
        };

        let flat = FlatL2Index::from_vectors(dim, &vectors)?;
        tracing::info!(cache_key, docs = flat.len(), ms = start.elapsed().as_millis() as u64, "vector index ready");
        Ok(Self { cache_key: cache_key.to_string(), flat })
    }

    /// The `k` nearest documents as `(squared distance, id)`, nearest first.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<(f32, DocId)>> {
        self.flat.search(query_vector, k)
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn dim(&self) -> usize {
        self.flat.dim()
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

fn embed_all(documents: &[String], cache_key: &str, embedder: &dyn Embedder) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(documents.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(cache_key.to_string());

    let mut vectors = Vec::with_capacity(documents.len());
    for batch in documents.chunks(EMBED_BATCH) {
        let embedded = embedder.embed_batch(batch)?;
        if embedded.len() != batch.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} texts",
                embedded.len(),
                batch.len()
            ))
            .into());
        }
        vectors.extend(embedded);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    Ok(vectors)
}
