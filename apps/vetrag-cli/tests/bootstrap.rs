use std::fs;

use tempfile::TempDir;
use vetrag_cli::{build_service, load_settings};
use vetrag_core::Category;

fn write_workspace(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("database")).unwrap();
    fs::write(
        dir.join("config.toml"),
        "[retrieval]\ntop_candidates = 2\n\n[embedding]\nuse_fake = true\nfake_dim = 16\n",
    )
    .unwrap();
    fs::write(
        dir.join("database/clinical_data.json"),
        r#"[{"Clinical Case": {"Disease": "Pyometra"}, "Generated Exam Data": {"Prognosis": "Good with surgery"}}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("database/disease_symptoms.json"),
        r#"[{"Disease": "Canine Parvovirus", "Symptoms": "vomiting"}, {"Disease": "Canine Distemper", "Symptoms": "cough"},
            {"Disease": "Feline Panleukopenia", "Symptoms": "fever"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join("database/pharma.json"),
        r#"[{"Active Ingredient": "Meloxicam", "pharma_info": {"dose_rate": {"dog": "0.2 mg/kg"}}}]"#,
    )
    .unwrap();
}

#[test]
fn settings_resolve_relative_to_config_dir() {
    let tmp = TempDir::new().unwrap();
    write_workspace(tmp.path());
    let settings = load_settings(tmp.path()).expect("settings");
    assert_eq!(settings.retrieval.top_candidates, 2);
    assert_eq!(settings.data.cache_dir, tmp.path().join("database/embeddings"));
    assert!(settings.embedding.use_fake);
}

#[test]
fn service_builds_and_writes_cache() {
    let tmp = TempDir::new().unwrap();
    write_workspace(tmp.path());
    let settings = load_settings(tmp.path()).expect("settings");

    let service = build_service(&settings).expect("service");
    assert_eq!(service.documents(Category::Disease).len(), 3);
    assert!(settings.data.cache_dir.exists(), "cache directory created");

    let search = service.search("canine distemper", Some(Category::Disease)).expect("search");
    assert!(search.candidates.len() <= 2);
    assert_eq!(search.candidates[0].id, 1);

    // second build reads the cache written by the first
    let again = build_service(&settings).expect("service");
    let repeat = again.search("canine distemper", Some(Category::Disease)).expect("search");
    assert_eq!(search.candidates, repeat.candidates);
}
