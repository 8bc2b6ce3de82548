use vetrag_core::records::PharmaRecord;
use vetrag_core::DoseQuery;

use crate::parse::{parse_request, ParsedRequest};

/// Every way a dose request can end. None of them is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DoseOutcome {
    Computed {
        active_ingredient: String,
        weight_kg: f64,
        species: String,
        rate_mg_per_kg: f64,
        dose_mg: f64,
        record: String,
    },
    PatternMismatch,
    SpeciesMissing { species: String, record: String },
    RateUnparseable { species: String, record: String },
    NoRecordMatch,
}

impl DoseOutcome {
    pub fn response(&self) -> String {
        match self {
            DoseOutcome::Computed { active_ingredient, weight_kg, species, rate_mg_per_kg, dose_mg, .. } => format!(
                "Calculated dose for '{active_ingredient}' in a {weight_kg:?} kg {species}: {dose_mg:?} mg (@{rate_mg_per_kg:?} mg/kg)."
            ),
            DoseOutcome::PatternMismatch => "Query does not match dose rate calculation format.".to_string(),
            DoseOutcome::SpeciesMissing { species, .. } => format!("No dose rate information available for {species}."),
            DoseOutcome::RateUnparseable { species, .. } => format!("Could not parse dose rate value for {species}."),
            DoseOutcome::NoRecordMatch => "No exact match found for the specified ingredient.".to_string(),
        }
    }

    /// The matched record as shown to the user; empty when nothing matched.
    pub fn reference(&self) -> String {
        match self {
            DoseOutcome::Computed { record, .. } => format!("Candidate (Exact Match):\n{record}"),
            DoseOutcome::SpeciesMissing { record, .. } | DoseOutcome::RateUnparseable { record, .. } => {
                format!("Candidate:\n{record}")
            }
            DoseOutcome::PatternMismatch | DoseOutcome::NoRecordMatch => String::new(),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, DoseOutcome::Computed { .. })
    }
}

/// Dose lookup over pharmaceutical records, scanned in order.
pub struct DoseResolver<'a> {
    records: &'a [PharmaRecord],
}

impl<'a> DoseResolver<'a> {
    pub fn new(records: &'a [PharmaRecord]) -> Self {
        Self { records }
    }

    /// Parses `text` and looks the request up. A request outside the grammar
    /// stops here; it is never retried as a search.
    pub fn resolve(&self, text: &str) -> DoseOutcome {
        match parse_request(text) {
            ParsedRequest::Parsed(query) => self.lookup(&query),
            ParsedRequest::NoMatch => {
                tracing::debug!(text, "dose request outside grammar");
                DoseOutcome::PatternMismatch
            }
        }
    }

    pub fn lookup(&self, query: &DoseQuery) -> DoseOutcome {
        let Some(record) = self.find_record(&query.ingredient_phrase) else {
            tracing::debug!(ingredient = %query.ingredient_phrase, "no pharma record matched");
            return DoseOutcome::NoRecordMatch;
        };
        let species = query.species.clone();
        let Some(rate_text) = record.dose_rate_for(&species) else {
            return DoseOutcome::SpeciesMissing { species, record: record.to_text() };
        };
        let Some(rate) = parse_rate(rate_text) else {
            return DoseOutcome::RateUnparseable { species, record: record.to_text() };
        };
        DoseOutcome::Computed {
            active_ingredient: record.active_ingredient.clone(),
            weight_kg: query.weight_kg,
            species,
            rate_mg_per_kg: rate,
            dose_mg: rate * query.weight_kg,
            record: record.to_text(),
        }
    }

    /// First record whose names match the phrase.
    ///
    /// One token: equality with the first word of a name. Several tokens:
    /// substring of a name. Both case-insensitive.
    pub fn find_record(&self, phrase: &str) -> Option<&'a PharmaRecord> {
        let phrase = phrase.trim().to_lowercase();
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        match tokens.as_slice() {
            [] => None,
            [single] => self.records.iter().find(|r| {
                r.names()
                    .iter()
                    .any(|name| name.to_lowercase().split_whitespace().next() == Some(*single))
            }),
            _ => self.records.iter().find(|r| {
                r.names().iter().any(|name| {
                    let name = name.trim().to_lowercase();
                    !name.is_empty() && name.contains(phrase.as_str())
                })
            }),
        }
    }
}

/// First run of digits and dots in the rate text, as a number.
pub fn parse_rate(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let run = &text[start..];
    let end = run.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(run.len());
    run[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_first_numeric_run() {
        assert_eq!(parse_rate("0.2 mg/kg"), Some(0.2));
        assert_eq!(parse_rate("about 5-10 mg/kg"), Some(5.0));
        assert_eq!(parse_rate("as directed"), None);
        assert_eq!(parse_rate(". mg/kg"), None);
    }

    #[test]
    fn computed_message_keeps_decimal_points() {
        let outcome = DoseOutcome::Computed {
            active_ingredient: "Meloxicam".into(),
            weight_kg: 10.0,
            species: "dog".into(),
            rate_mg_per_kg: 0.2,
            dose_mg: 2.0,
            record: "Active Ingredient: Meloxicam".into(),
        };
        assert_eq!(
            outcome.response(),
            "Calculated dose for 'Meloxicam' in a 10.0 kg dog: 2.0 mg (@0.2 mg/kg)."
        );
        assert_eq!(outcome.reference(), "Candidate (Exact Match):\nActive Ingredient: Meloxicam");
    }

    #[test]
    fn negative_outcomes_without_record_have_empty_reference() {
        assert!(DoseOutcome::PatternMismatch.reference().is_empty());
        assert!(DoseOutcome::NoRecordMatch.reference().is_empty());
        assert_eq!(
            DoseOutcome::NoRecordMatch.response(),
            "No exact match found for the specified ingredient."
        );
    }
}
