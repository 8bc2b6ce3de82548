//! vetrag-vector
//!
//! Exact L2 nearest-neighbour indexes per domain, with embeddings persisted in
//! a LanceDB table so warm starts skip the encoder.

pub mod cache;
pub mod flat;
pub mod index;
pub mod schema;

pub use cache::{content_hash, CacheLookup, EmbeddingCache};
pub use flat::{similarity, FlatL2Index};
pub use index::{BuildLocks, VectorIndex};
