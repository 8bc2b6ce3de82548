//! Domain types shared by the classifier, the indexes and the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Position of a document inside its domain corpus.
pub type DocId = usize;

/// One of the three corpora a query can be routed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pharma,
    Clinical,
    Disease,
}

impl Category {
    /// Evaluation order used when category scores tie.
    pub const PRIORITY: [Category; 3] = [Category::Pharma, Category::Clinical, Category::Disease];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pharma => "pharma",
            Category::Clinical => "clinical",
            Category::Disease => "disease",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pharma" => Ok(Category::Pharma),
            "clinical" => Ok(Category::Clinical),
            "disease" => Ok(Category::Disease),
            other => Err(Error::NotFound(format!("unknown category '{other}'"))),
        }
    }
}

/// A display-ready record held by a domain index. Immutable once indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub domain: Category,
    pub text: String,
}

impl Document {
    /// Assigns positional ids to an ordered list of texts.
    pub fn from_texts<I, S>(domain: Category, texts: I) -> Vec<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Document { id, domain, text: text.into() })
            .collect()
    }
}

/// A ranked document with its per-query scores.
///
/// `hybrid_score = alpha * vector_score + (1 - alpha) * lexical_score`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateScore {
    pub id: DocId,
    pub text: String,
    pub vector_score: f32,
    pub lexical_score: f32,
    pub hybrid_score: f32,
}

/// Parsed form of a dose calculation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseQuery {
    pub ingredient_phrase: String,
    pub weight_kg: f64,
    /// Always lowercase.
    pub species: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Pharma".parse::<Category>().ok(), Some(Category::Pharma));
        assert_eq!(" disease ".parse::<Category>().ok(), Some(Category::Disease));
        assert!("surgery".parse::<Category>().is_err());
    }

    #[test]
    fn documents_get_positional_ids() {
        let docs = Document::from_texts(Category::Clinical, ["a", "b", "c"]);
        let ids: Vec<DocId> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(docs.iter().all(|d| d.domain == Category::Clinical));
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Disease).unwrap();
        assert_eq!(json, "\"disease\"");
    }
}
