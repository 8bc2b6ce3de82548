use anyhow::Result;
use vetrag_core::{DocId, Error};

/// Exact nearest-neighbour search over squared L2 distance.
///
/// Rows are stored contiguously; the row index is the document id.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    pub fn from_vectors(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dim);
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<DocId> {
        if vector.len() != self.dim {
            return Err(Error::Embedding(format!("vector has dimension {}, index expects {}", vector.len(), self.dim)).into());
        }
        let id = self.len();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` closest rows as `(distance, id)`, nearest first. Equal distances
    /// are ordered by ascending id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, DocId)>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::Embedding(format!("query has dimension {}, index expects {}", query.len(), self.dim)).into());
        }
        let mut scored: Vec<(f32, DocId)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| (squared_l2(query, row), id))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        Ok(scored)
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Maps a distance to a similarity in (0, 1]; zero distance gives 1.
pub fn similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatL2Index {
        FlatL2Index::from_vectors(2, &[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 3.0], vec![-1.0, 0.0]]).unwrap()
    }

    #[test]
    fn nearest_first_with_id_tiebreak() {
        let hits = index().search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(hits, vec![(0.0, 0), (1.0, 1), (1.0, 3)]);
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        assert_eq!(index().search(&[0.0, 3.0], 10).unwrap().len(), 4);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let empty = FlatL2Index::new(8);
        assert!(empty.search(&[0.0; 3], 5).unwrap().is_empty());
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        assert!(index().search(&[0.0, 0.0, 0.0], 1).is_err());
        assert!(FlatL2Index::new(2).add(&[1.0]).is_err());
    }

    #[test]
    fn similarity_is_bounded_and_decreasing() {
        assert_eq!(similarity(0.0), 1.0);
        assert_eq!(similarity(1.0), 0.5);
        assert!(similarity(10.0) < similarity(2.0));
        assert!(similarity(1e9) > 0.0);
    }
}
