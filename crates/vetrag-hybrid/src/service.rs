use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use vetrag_core::records::{Corpora, PharmaRecord};
use vetrag_core::traits::Embedder;
use vetrag_core::{CandidateScore, Category, Document};
use vetrag_dose::{looks_like_dose_request, DoseOutcome, DoseResolver};
use vetrag_text::{CategoryClassifier, LexicalStrategy};
use vetrag_vector::{BuildLocks, EmbeddingCache, VectorIndex};

use crate::merge::{rank, RankParams};

/// A built domain: its documents, their vectors and the lexical scorer it ranks with.
pub struct DomainIndex {
    pub documents: Vec<Document>,
    pub index: VectorIndex,
    pub lexical: LexicalStrategy,
}

/// Ranked candidates for the domain a query was routed to.
#[derive(Debug, Clone)]
pub struct Search {
    pub category: Category,
    pub candidates: Vec<CandidateScore>,
}

#[derive(Debug, Clone)]
pub enum Retrieval {
    /// Dose requests skip ranking.
    Dose(DoseOutcome),
    Ranked(Search),
}

/// Everything a query needs, built once at startup and read-only afterwards.
///
/// The encoder is shared by all domains; see `BertEmbedder` for how it
/// serializes forward passes.
pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    classifier: CategoryClassifier,
    domains: BTreeMap<Category, DomainIndex>,
    pharma: Vec<PharmaRecord>,
    params: RankParams,
}

impl RetrievalService {
    /// Builds the three domain indexes one after another.
    pub async fn build(
        corpora: Corpora,
        embedder: Arc<dyn Embedder>,
        cache: Option<&EmbeddingCache>,
        params: RankParams,
    ) -> Result<Self> {
        let locks = BuildLocks::new();
        let mut domains = BTreeMap::new();
        for category in Category::PRIORITY {
            let documents = corpora.documents(category);
            let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
            let index = VectorIndex::build(&texts, category.as_str(), embedder.as_ref(), cache, &locks).await?;
            let lexical = LexicalStrategy::for_category(category);
            tracing::info!(%category, docs = documents.len(), lexical = lexical.name(), "domain ready");
            domains.insert(category, DomainIndex { documents, index, lexical });
        }
        Ok(Self {
            embedder,
            classifier: CategoryClassifier::default(),
            domains,
            pharma: corpora.pharma,
            params,
        })
    }

    pub fn classify(&self, query: &str) -> Category {
        self.classifier.classify(query)
    }

    /// Ranks `query` in `domain`, or in the classified domain when none is given.
    pub fn search(&self, query: &str, domain: Option<Category>) -> Result<Search> {
        let category = domain.unwrap_or_else(|| self.classify(query));
        let Some(d) = self.domains.get(&category) else {
            return Ok(Search { category, candidates: Vec::new() });
        };
        let candidates = rank(
            query,
            category,
            &d.documents,
            &d.index,
            self.embedder.as_ref(),
            &d.lexical,
            &self.params,
        )?;
        if candidates.is_empty() {
            tracing::info!(%category, query, "no candidates");
        }
        Ok(Search { category, candidates })
    }

    /// Dose requests go to the resolver, everything else is ranked.
    pub fn retrieve(&self, query: &str, domain: Option<Category>) -> Result<Retrieval> {
        if is_dose_request(query) {
            return Ok(Retrieval::Dose(self.resolve_dose(query)));
        }
        self.search(query, domain).map(Retrieval::Ranked)
    }

    pub fn resolve_dose(&self, text: &str) -> DoseOutcome {
        DoseResolver::new(&self.pharma).resolve(text)
    }

    pub fn documents(&self, category: Category) -> &[Document] {
        self.domains.get(&category).map_or(&[][..], |d| d.documents.as_slice())
    }

    pub fn params(&self) -> &RankParams {
        &self.params
    }
}

pub fn is_dose_request(text: &str) -> bool {
    looks_like_dose_request(text)
}
