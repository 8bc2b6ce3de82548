//! Lance-backed embedding cache, one table per domain.
//!
//! A table is named `<cache_key>_d<dim>` and stores one row per document with
//! its corpus position, a blake3 hash of the document text and the id of the
//! embedder that produced the vector. An entry is reused only when all of those
//! agree with the corpus being indexed; anything else is treated as a miss.

use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{
    FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray,
};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::table::AddDataMode;
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::schema::build_cache_schema;

pub struct EmbeddingCache {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Vectors in document order.
    Hit(Vec<Vec<f32>>),
    Absent,
    /// Stored entry exists but cannot be reused.
    Mismatch(String),
}

impl EmbeddingCache {
    pub async fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = connect(dir.to_string_lossy().as_ref()).execute().await?;
        Ok(Self { conn })
    }

    pub fn table_name(cache_key: &str, dim: usize) -> String {
        let key: String = cache_key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("{key}_d{dim}")
    }

    /// Reads the entry for `cache_key` and checks it against `documents`.
    pub async fn load(
        &self,
        cache_key: &str,
        embedder_id: &str,
        dim: usize,
        documents: &[String],
    ) -> Result<CacheLookup> {
        let table = Self::table_name(cache_key, dim);
        let names = self.conn.table_names().execute().await?;
        if !names.contains(&table) {
            return Ok(CacheLookup::Absent);
        }
        let t = self.conn.open_table(&table).execute().await?;
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; documents.len()];
        let mut rows = 0usize;
        let mut stream = t.query().execute().await?;
        while let Some(batch) = stream.try_next().await? {
            let positions = column::<Int32Array>(&batch, "position")?;
            let hashes = column::<StringArray>(&batch, "content_hash")?;
            let embedders = column::<StringArray>(&batch, "embedder_id")?;
            let vectors = column::<FixedSizeListArray>(&batch, "vector")?;
            for i in 0..batch.num_rows() {
                rows += 1;
                if embedders.value(i) != embedder_id {
                    return Ok(CacheLookup::Mismatch(format!("embedder {}", embedders.value(i))));
                }
                let Some(pos) = usize::try_from(positions.value(i)).ok().filter(|p| *p < documents.len()) else {
                    return Ok(CacheLookup::Mismatch(format!("position {} out of range", positions.value(i))));
                };
                if hashes.value(i) != content_hash(&documents[pos]) {
                    return Ok(CacheLookup::Mismatch(format!("document {pos} changed")));
                }
                let row = vectors.value(i);
                let Some(values) = row.as_primitive_opt::<Float32Type>() else {
                    return Ok(CacheLookup::Mismatch(format!("vector column is {}, not Float32", row.data_type())));
                };
                let values: Vec<f32> = values.values().to_vec();
                if values.len() != dim {
                    return Ok(CacheLookup::Mismatch(format!("vector {pos} has dimension {}", values.len())));
                }
                slots[pos] = Some(values);
            }
        }
        if rows != documents.len() {
            return Ok(CacheLookup::Mismatch(format!("{rows} rows for {} documents", documents.len())));
        }
        let mut vectors = Vec::with_capacity(slots.len());
        for (pos, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(v) => vectors.push(v),
                None => return Ok(CacheLookup::Mismatch(format!("position {pos} missing"))),
            }
        }
        Ok(CacheLookup::Hit(vectors))
    }

    /// Replaces the entry for `cache_key` with `vectors`.
    pub async fn store(
        &self,
        cache_key: &str,
        embedder_id: &str,
        dim: usize,
        documents: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        if documents.len() != vectors.len() {
            return Err(anyhow!("{} documents but {} vectors", documents.len(), vectors.len()));
        }
        let width = i32::try_from(dim)?;
        let schema = build_cache_schema(width);
        let now = Utc::now().timestamp_millis();
        let mut positions = Vec::with_capacity(documents.len());
        let mut hashes = Vec::with_capacity(documents.len());
        for (pos, doc) in documents.iter().enumerate() {
            positions.push(i32::try_from(pos)?);
            hashes.push(content_hash(doc));
        }
        let rows: Vec<Option<Vec<Option<f32>>>> =
            vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(positions)),
                Arc::new(StringArray::from(hashes)),
                Arc::new(StringArray::from(vec![embedder_id.to_string(); documents.len()])),
                Arc::new(TimestampMillisecondArray::from(vec![now; documents.len()])),
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(rows.into_iter(), width)),
            ],
        )?;
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));

        let table = Self::table_name(cache_key, dim);
        if self.conn.table_names().execute().await?.contains(&table) {
            // Overwrite replaces the rows and the layout, so tables from an older
            // schema are rewritten in place.
            let t = self.conn.open_table(&table).execute().await?;
            t.add(reader).mode(AddDataMode::Overwrite).execute().await?;
        } else {
            self.conn.create_table(&table, reader).execute().await?;
        }
        tracing::info!(%table, rows = documents.len(), "embedding cache written");
        Ok(())
    }
}

pub fn content_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

fn column<'a, A: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<A>())
        .ok_or_else(|| anyhow!("cache column '{}' missing or mistyped", name))
}
