//! vetrag-text
//!
//! Token pipelines, the two lexical scoring strategies and the phrase-based
//! category classifier.

pub mod classifier;
pub mod lexical;
pub mod tokenize;

pub use classifier::CategoryClassifier;
pub use lexical::{LexicalStrategy, ProgressivePrefixScorer, TokenOverlapScorer};
pub use tokenize::Analyzer;
