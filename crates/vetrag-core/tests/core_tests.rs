use std::fs;

use tempfile::TempDir;

use vetrag_core::config::DataSettings;
use vetrag_core::records::{load_records, Corpora, PharmaRecord};
use vetrag_core::{Category, Error};

fn write_corpora(dir: &std::path::Path) -> DataSettings {
    fs::write(
        dir.join("clinical.json"),
        r#"[{"Clinical Case": {"Disease": "Pyometra"}, "Generated Exam Data": {"Prognosis": "Good"}}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("disease.json"),
        r#"[{"Disease": "Canine oral plasmacytoma"}, {"Disease": "Canine parvovirus"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("pharma.json"),
        r#"{"Active Ingredient": "Meloxicam", "pharma_info": {"dose_rate": {"dog": "0.2 mg/kg"}}}"#,
    )
    .unwrap();
    DataSettings {
        clinical_path: dir.join("clinical.json"),
        disease_path: dir.join("disease.json"),
        pharma_path: dir.join("pharma.json"),
        cache_dir: dir.join("cache"),
    }
}

#[test]
fn corpora_load_all_three_domains() {
    let tmp = TempDir::new().unwrap();
    let data = write_corpora(tmp.path());

    let corpora = Corpora::load(&data).expect("load");

    assert_eq!(corpora.clinical.len(), 1);
    assert_eq!(corpora.disease.len(), 2);
    assert_eq!(corpora.pharma.len(), 1, "single object becomes one record");
    let disease_docs = corpora.documents(Category::Disease);
    assert_eq!(disease_docs[1].id, 1);
    assert!(disease_docs[1].text.starts_with("Disease: Canine parvovirus"));
}

#[test]
fn missing_corpus_is_a_corpus_error() {
    let tmp = TempDir::new().unwrap();
    let err = load_records::<PharmaRecord>(&tmp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Corpus(_)));
}

#[test]
fn malformed_corpus_is_a_corpus_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.json");
    fs::write(&path, "[{\"Active Ingredient\": ").unwrap();
    let err = load_records::<PharmaRecord>(&path).unwrap_err();
    assert!(matches!(err, Error::Corpus(_)));
}
