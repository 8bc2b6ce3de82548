use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// Layout of one per-domain embedding cache table. Row `position` holds the
/// vector of the document at that index in the corpus.
pub fn build_cache_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("position", DataType::Int32, false),
		Field::new("content_hash", DataType::Utf8, false),
		Field::new("embedder_id", DataType::Utf8, false),
		Field::new("created_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
