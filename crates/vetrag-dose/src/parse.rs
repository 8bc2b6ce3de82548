//! Grammar for explicit dose requests:
//! `calculate [the] dose rate of <ingredient> (, | in) [a] <int> kg <species>`.

use regex::Regex;
use std::sync::LazyLock;

use vetrag_core::DoseQuery;

static DOSE_REQUEST_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)calculate (?:the )?dose rate of\s+(.+?)\s*(?:,|in)\s*(?:a\s*)?([0-9]+)\s*kg\s*(\w+)").ok()
});

static LEAD_IN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bcalculate (?:the )?dose rate of\b").ok());

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRequest {
    Parsed(DoseQuery),
    NoMatch,
}

/// Searches `text` for a dose request. Only the first occurrence is used.
pub fn parse_request(text: &str) -> ParsedRequest {
    let Some(re) = DOSE_REQUEST_RE.as_ref() else {
        tracing::error!("dose request pattern failed to compile");
        return ParsedRequest::NoMatch;
    };
    let Some(caps) = re.captures(text) else { return ParsedRequest::NoMatch };
    let (Some(ingredient), Some(weight), Some(species)) = (caps.get(1), caps.get(2), caps.get(3)) else {
        return ParsedRequest::NoMatch;
    };
    let Ok(weight_kg) = weight.as_str().parse::<f64>() else { return ParsedRequest::NoMatch };
    ParsedRequest::Parsed(DoseQuery {
        ingredient_phrase: ingredient.as_str().trim().to_string(),
        weight_kg,
        species: species.as_str().trim().to_lowercase(),
    })
}

/// True when the text opens a dose calculation, whether or not the rest of
/// the request is well formed.
pub fn looks_like_dose_request(text: &str) -> bool {
    LEAD_IN_RE.as_ref().is_some_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> DoseQuery {
        match parse_request(text) {
            ParsedRequest::Parsed(q) => q,
            ParsedRequest::NoMatch => panic!("expected a match for {text:?}"),
        }
    }

    #[test]
    fn comma_form() {
        let q = parsed("Calculate the dose rate of Meloxicam, 10 kg Dog");
        assert_eq!(q.ingredient_phrase, "Meloxicam");
        assert_eq!(q.weight_kg, 10.0);
        assert_eq!(q.species, "dog");
    }

    #[test]
    fn in_a_form_with_multi_word_ingredient() {
        let q = parsed("please calculate dose rate of amoxicillin clavulanate in a 25kg cat thanks");
        assert_eq!(q.ingredient_phrase, "amoxicillin clavulanate");
        assert_eq!(q.weight_kg, 25.0);
        assert_eq!(q.species, "cat");
    }

    #[test]
    fn missing_weight_clause_is_no_match() {
        assert_eq!(parse_request("what is the dose of meloxicam"), ParsedRequest::NoMatch);
        assert_eq!(parse_request("calculate the dose rate of meloxicam for my dog"), ParsedRequest::NoMatch);
    }

    #[test]
    fn decimal_weight_is_not_part_of_the_grammar() {
        assert_eq!(parse_request("calculate dose rate of meloxicam, 2.5 kg dog"), ParsedRequest::NoMatch);
    }

    #[test]
    fn lead_in_detection() {
        assert!(looks_like_dose_request("Calculate the dose rate of xyz"));
        assert!(!looks_like_dose_request("what is the dose rate of xyz"));
    }
}
