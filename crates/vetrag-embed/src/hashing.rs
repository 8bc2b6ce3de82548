use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;
use vetrag_core::traits::Embedder;

/// Deterministic bag-of-tokens embedder for tests and offline runs.
///
/// Each lowercased whitespace token is hashed into one bucket; the vector is
/// L2-normalized. Texts sharing tokens end up close in L2 space.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hashing:d{dim}") }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 1.0 + val * 0.1 + (i % 3) as f32 * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_vector() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.embed_text("Canine Parvovirus"), e.embed_text("canine parvovirus"));
    }

    #[test]
    fn vectors_have_unit_norm() {
        let v = HashingEmbedder::new(32).embed_text("meloxicam for dogs");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(8).embed_text("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn id_carries_dimension() {
        assert_eq!(HashingEmbedder::new(384).embedder_id(), "hashing:d384");
        assert_eq!(HashingEmbedder::new(0).dim(), 1);
    }
}
