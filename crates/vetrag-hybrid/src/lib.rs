//! vetrag-hybrid
//!
//! Fuses vector and lexical similarity into one ranked candidate list and
//! wires classifier, indexes and dose resolver into a single service.

pub mod merge;
pub mod service;

pub use merge::{hybrid_score, rank, RankParams};
pub use service::{is_dose_request, DomainIndex, Retrieval, RetrievalService, Search};
