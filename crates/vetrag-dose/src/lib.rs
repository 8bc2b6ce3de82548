//! vetrag-dose
//!
//! Parses explicit dose calculation requests and computes the dose from the
//! matching pharmaceutical record's per-species rate.

pub mod parse;
pub mod resolve;

pub use parse::{looks_like_dose_request, parse_request, ParsedRequest};
pub use resolve::{parse_rate, DoseOutcome, DoseResolver};
