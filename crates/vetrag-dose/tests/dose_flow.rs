use vetrag_core::records::{parse_records, PharmaRecord};
use vetrag_dose::{DoseOutcome, DoseResolver};

const PHARMA: &str = r#"[
  {
    "Active Ingredient": "Meloxicam",
    "Trade Name": "Metacam Oral Suspension",
    "Ingredient": "Meloxicam 1.5 mg/ml",
    "pharma_info": {
      "dose_rate": { "dog": "0.2 mg/kg", "cat": "0.05 mg/kg" },
      "indication": "Inflammation and pain"
    }
  },
  {
    "Active Ingredient": "Amoxicillin Clavulanate",
    "Trade Name": "Synulox",
    "Ingredient": "",
    "pharma_info": {
      "dose_rate": { "dog": "12.5 mg/kg", "cat": "see label" }
    }
  },
  {
    "Active Ingredient": "Metronidazole",
    "Trade Name": "Metrobactin",
    "pharma_info": { "dose_rate": { "dog": "15 mg/kg" } }
  }
]"#;

fn records() -> Vec<PharmaRecord> {
    parse_records(PHARMA).expect("fixture")
}

#[test]
fn meloxicam_for_ten_kilo_dog() {
    let records = records();
    let outcome = DoseResolver::new(&records).resolve("Calculate the dose rate of meloxicam, 10 kg dog");
    assert!(outcome.is_computed());
    assert_eq!(
        outcome.response(),
        "Calculated dose for 'Meloxicam' in a 10.0 kg dog: 2.0 mg (@0.2 mg/kg)."
    );
    assert!(outcome.reference().starts_with("Candidate (Exact Match):\nActive Ingredient: Meloxicam"));
}

#[test]
fn missing_species_surfaces_the_candidate() {
    let records = records();
    let outcome = DoseResolver::new(&records).resolve("calculate dose rate of metronidazole in a 4 kg cat");
    assert!(matches!(outcome, DoseOutcome::SpeciesMissing { .. }));
    assert!(outcome.response().contains("No dose rate information available for cat"));
    assert!(outcome.reference().contains("Active Ingredient: Metronidazole"));
}

#[test]
fn unparseable_rate_surfaces_the_candidate() {
    let records = records();
    let outcome = DoseResolver::new(&records).resolve("calculate dose rate of synulox, 3 kg cat");
    assert_eq!(outcome.response(), "Could not parse dose rate value for cat.");
    assert!(outcome.reference().starts_with("Candidate:\n"));
}

#[test]
fn pattern_mismatch_never_looks_up() {
    let records = records();
    let outcome = DoseResolver::new(&records).resolve("what is the dose of meloxicam");
    assert_eq!(outcome, DoseOutcome::PatternMismatch);
    assert_eq!(outcome.response(), "Query does not match dose rate calculation format.");
    assert!(outcome.reference().is_empty());
}

#[test]
fn single_token_needs_first_word_equality() {
    let records = records();
    let resolver = DoseResolver::new(&records);
    // "metacam" is the first word of a trade name
    assert_eq!(resolver.find_record("Metacam").map(|r| r.active_ingredient.as_str()), Some("Meloxicam"));
    // "clavulanate" is inside a name but not its first word
    assert!(resolver.find_record("clavulanate").is_none());
    // a prefix of a first word is not equality
    assert!(resolver.find_record("melox").is_none());
}

#[test]
fn multi_token_matches_by_substring() {
    let records = records();
    let resolver = DoseResolver::new(&records);
    assert_eq!(
        resolver.find_record("amoxicillin clav").map(|r| r.trade_name.as_str()),
        Some("Synulox")
    );
    assert_eq!(
        resolver.find_record("oral suspension").map(|r| r.active_ingredient.as_str()),
        Some("Meloxicam")
    );
}

#[test]
fn unknown_ingredient_has_empty_reference() {
    let records = records();
    let outcome = DoseResolver::new(&records).resolve("calculate the dose rate of ivermectin, 8 kg dog");
    assert_eq!(outcome, DoseOutcome::NoRecordMatch);
    assert!(outcome.reference().is_empty());
}

#[test]
fn first_matching_record_wins() {
    let mut records = records();
    let mut shadow = records[0].clone();
    shadow.trade_name = "Meloxicam Shadow".into();
    shadow.info.dose_rate = vec![("dog".into(), "1 mg/kg".into())];
    records.push(shadow);
    let outcome = DoseResolver::new(&records).resolve("calculate dose rate of meloxicam, 10 kg dog");
    assert!(outcome.response().contains("(@0.2 mg/kg)"));
}
