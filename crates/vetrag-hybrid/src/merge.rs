use anyhow::Result;
use std::collections::BTreeMap;

use vetrag_core::config::RetrievalSettings;
use vetrag_core::traits::{Embedder, LexicalScorer};
use vetrag_core::{CandidateScore, Category, DocId, Document};
use vetrag_vector::{similarity, VectorIndex};

/// Knobs for one ranking call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    pub top_k_vector: usize,
    pub top_candidates: usize,
    /// Weight of the vector score; the lexical score gets `1 - alpha`.
    pub alpha: f32,
}

impl Default for RankParams {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for RankParams {
    fn from(s: &RetrievalSettings) -> Self {
        Self { top_k_vector: s.top_k_vector, top_candidates: s.top_candidates, alpha: s.alpha }
    }
}

pub fn hybrid_score(alpha: f32, vector_score: f32, lexical_score: f32) -> f32 {
    alpha * vector_score + (1.0 - alpha) * lexical_score
}

/// Ranks one domain's documents against `query`.
///
/// The `top_k_vector` nearest documents and every document with a positive
/// lexical score become candidates, merged by id. Candidates are ordered by
/// hybrid score, highest first, with ties broken by ascending id, and cut to
/// `top_candidates`.
pub fn rank(
    query: &str,
    domain: Category,
    documents: &[Document],
    index: &VectorIndex,
    embedder: &dyn Embedder,
    lexical: &dyn LexicalScorer,
    params: &RankParams,
) -> Result<Vec<CandidateScore>> {
    let mut scores: BTreeMap<DocId, (f32, f32)> = BTreeMap::new();

    let k = params.top_k_vector.min(index.len());
    if k > 0 {
        let query_vector = embedder
            .embed_batch(&[query.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for the query"))?;
        for (distance, id) in index.search(&query_vector, k)? {
            scores.insert(id, (similarity(distance), 0.0));
        }
    }

    for doc in documents {
        let lexical_score = lexical.score(query, &doc.text);
        if lexical_score > 0.0 {
            scores.entry(doc.id).or_insert((0.0, 0.0)).1 = lexical_score;
        }
    }

    let texts: BTreeMap<DocId, &str> = documents.iter().map(|d| (d.id, d.text.as_str())).collect();
    let mut candidates: Vec<CandidateScore> = scores
        .into_iter()
        .filter_map(|(id, (vector_score, lexical_score))| {
            let text = texts.get(&id)?;
            Some(CandidateScore {
                id,
                text: (*text).to_string(),
                vector_score,
                lexical_score,
                hybrid_score: hybrid_score(params.alpha, vector_score, lexical_score),
            })
        })
        .collect();
    candidates.sort_by(|a, b| b.hybrid_score.total_cmp(&a.hybrid_score).then(a.id.cmp(&b.id)));
    candidates.truncate(params.top_candidates);

    tracing::debug!(%domain, query, candidates = candidates.len(), "ranked");
    Ok(candidates)
}
