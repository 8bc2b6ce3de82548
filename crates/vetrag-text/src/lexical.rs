//! Lexical similarity strategies.
//!
//! `TokenOverlap` is order-insensitive: the share of distinct query tokens that
//! also occur in the document. `ProgressivePrefix` only looks at the disease
//! name line and rewards queries that agree with it from the first token on.

use std::collections::HashSet;

use vetrag_core::traits::LexicalScorer;
use vetrag_core::Category;

use crate::tokenize::Analyzer;

/// Field label of the line the prefix scorer compares against.
pub const DISEASE_FIELD: &str = "Disease:";

#[derive(Clone, Default)]
pub struct TokenOverlapScorer {
    analyzer: Analyzer,
}

impl TokenOverlapScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LexicalScorer for TokenOverlapScorer {
    fn score(&self, query: &str, document: &str) -> f32 {
        let query_tokens: HashSet<String> = self.analyzer.tokens(query).into_iter().collect();
        if query_tokens.is_empty() {
            return 0.0;
        }
        let doc_tokens: HashSet<String> = self.analyzer.tokens(document).into_iter().collect();
        let shared = query_tokens.intersection(&doc_tokens).count();
        shared as f32 / query_tokens.len() as f32
    }
}

#[derive(Clone)]
pub struct ProgressivePrefixScorer {
    analyzer: Analyzer,
    field: String,
}

impl ProgressivePrefixScorer {
    pub fn new() -> Self {
        Self::for_field(DISEASE_FIELD)
    }

    pub fn for_field(field: &str) -> Self {
        Self { analyzer: Analyzer::whitespace(), field: field.to_string() }
    }

    /// Value of the first line starting with the field label, if any.
    pub fn field_value<'a>(&self, document: &'a str) -> Option<&'a str> {
        document
            .lines()
            .map(str::trim_start)
            .find_map(|line| line.strip_prefix(self.field.as_str()))
    }

    /// Length of the shared leading run of two token sequences.
    pub fn matched_prefix(query: &[String], name: &[String]) -> usize {
        query.iter().zip(name).take_while(|(q, n)| q == n).count()
    }
}

impl Default for ProgressivePrefixScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalScorer for ProgressivePrefixScorer {
    fn score(&self, query: &str, document: &str) -> f32 {
        let Some(name) = self.field_value(document) else { return 0.0 };
        let query_tokens = self.analyzer.tokens(query);
        if query_tokens.is_empty() {
            return 0.0;
        }
        let name_tokens = self.analyzer.tokens(name);
        Self::matched_prefix(&query_tokens, &name_tokens) as f32 / query_tokens.len() as f32
    }
}

/// The lexical scorer a domain ranks with.
#[derive(Clone)]
pub enum LexicalStrategy {
    TokenOverlap(TokenOverlapScorer),
    ProgressivePrefix(ProgressivePrefixScorer),
}

impl LexicalStrategy {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Disease => LexicalStrategy::ProgressivePrefix(ProgressivePrefixScorer::new()),
            Category::Pharma | Category::Clinical => LexicalStrategy::TokenOverlap(TokenOverlapScorer::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LexicalStrategy::TokenOverlap(_) => "token-overlap",
            LexicalStrategy::ProgressivePrefix(_) => "progressive-prefix",
        }
    }
}

impl LexicalScorer for LexicalStrategy {
    fn score(&self, query: &str, document: &str) -> f32 {
        match self {
            LexicalStrategy::TokenOverlap(s) => s.score(query, document),
            LexicalStrategy::ProgressivePrefix(s) => s.score(query, document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn overlap_counts_shared_distinct_tokens() {
        let s = TokenOverlapScorer::new();
        let score = s.score("Meloxicam dose dog", "meloxicam is an NSAID for the dog");
        assert!((score - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_ignores_order_and_repeats() {
        let s = TokenOverlapScorer::new();
        assert_eq!(s.score("dog dog dog", "a dog"), 1.0);
        assert_eq!(s.score("oral canine", "canine oral"), 1.0);
    }

    #[test]
    fn overlap_of_empty_query_is_zero() {
        assert_eq!(TokenOverlapScorer::new().score("  ", "anything"), 0.0);
    }

    #[test]
    fn prefix_walk_stops_at_first_mismatch() {
        let q = toks(&["canine", "oral"]);
        assert_eq!(ProgressivePrefixScorer::matched_prefix(&q, &toks(&["canine", "oral", "plasmacytoma"])), 2);
        assert_eq!(ProgressivePrefixScorer::matched_prefix(&q, &toks(&["canine", "parvovirus"])), 1);
        assert_eq!(ProgressivePrefixScorer::matched_prefix(&q, &toks(&["feline", "oral"])), 0);
    }

    #[test]
    fn prefix_scores_against_disease_line() {
        let s = ProgressivePrefixScorer::new();
        let plasmacytoma = "Disease: Canine Oral Plasmacytoma\nSymptoms: oral mass";
        let parvo = "Disease: Canine Parvovirus\nSymptoms: vomiting";
        assert_eq!(s.score("canine oral", plasmacytoma), 1.0);
        assert_eq!(s.score("canine oral", parvo), 0.5);
        assert_eq!(s.score("oral mass", plasmacytoma), 0.0, "symptom line is not consulted");
    }

    #[test]
    fn prefix_without_disease_line_is_zero() {
        assert_eq!(ProgressivePrefixScorer::new().score("canine", "Symptoms: canine cough"), 0.0);
    }

    #[test]
    fn strategy_follows_domain() {
        assert_eq!(LexicalStrategy::for_category(Category::Disease).name(), "progressive-prefix");
        assert_eq!(LexicalStrategy::for_category(Category::Pharma).name(), "token-overlap");
        assert_eq!(LexicalStrategy::for_category(Category::Clinical).name(), "token-overlap");
    }
}
