//! Structured source records for the three corpora and their display text.
//!
//! Every field is optional in the source JSON and defaults to empty. Values
//! that are not strings (numbers, lists, nested objects) are rendered to text
//! on load so downstream code only ever sees `String`s.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::config::DataSettings;
use crate::error::Error;
use crate::types::{Category, Document};

/// Ordered `label -> text` pairs, kept in source order.
pub type Section = Vec<(String, String)>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ClinicalCase {
    #[serde(rename = "Clinical Case", default)]
    pub case: CaseHeader,
    #[serde(rename = "Generated Exam Data", default)]
    pub exam: ExamData,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CaseHeader {
    #[serde(rename = "Disease", default, deserialize_with = "text")]
    pub disease: String,
    #[serde(rename = "Synonyms", default, deserialize_with = "text")]
    pub synonyms: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExamData {
    #[serde(rename = "Clinical Examination", default, deserialize_with = "section")]
    pub clinical_examination: Section,
    #[serde(rename = "Diagnostic Workup", default, deserialize_with = "section")]
    pub diagnostic_workup: Section,
    #[serde(rename = "Diagnosis", default, deserialize_with = "text")]
    pub diagnosis: String,
    #[serde(rename = "Drug of Choice", default, deserialize_with = "optional_text")]
    pub drug_of_choice: Option<String>,
    #[serde(rename = "Differential Diagnosis", default, deserialize_with = "optional_text")]
    pub differential_diagnosis: Option<String>,
    #[serde(rename = "Line of Treatment", default, deserialize_with = "section")]
    pub line_of_treatment: Section,
    #[serde(rename = "Prognosis", default, deserialize_with = "text")]
    pub prognosis: String,
    #[serde(rename = "Client Education & Prevention", default, deserialize_with = "text")]
    pub client_education: String,
}

impl ClinicalCase {
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Disease: {}\nSynonyms: {}\n\nClinical Examination:\n",
            self.case.disease, self.case.synonyms
        );
        push_section(&mut out, &self.exam.clinical_examination);
        out.push_str("\nDiagnostic Workup:\n");
        push_section(&mut out, &self.exam.diagnostic_workup);
        out.push_str(&format!("\nDiagnosis: {}\n\n", self.exam.diagnosis));
        if let Some(drug) = &self.exam.drug_of_choice {
            out.push_str(&format!("Drug of Choice: {drug}\n"));
        }
        if let Some(ddx) = &self.exam.differential_diagnosis {
            out.push_str(&format!("Differential Diagnosis: {ddx}\n"));
        }
        out.push_str("Line of Treatment:\n");
        push_section(&mut out, &self.exam.line_of_treatment);
        out.push_str(&format!(
            "\nPrognosis: {}\nClient Education & Prevention: {}",
            self.exam.prognosis, self.exam.client_education
        ));
        out.trim().to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DiseaseSheet {
    #[serde(rename = "Disease", default, deserialize_with = "text")]
    pub disease: String,
    #[serde(rename = "Symptoms", default, deserialize_with = "text")]
    pub symptoms: String,
    #[serde(rename = "Clinical_Signs", default, deserialize_with = "text")]
    pub clinical_signs: String,
}

impl DiseaseSheet {
    pub fn to_text(&self) -> String {
        format!(
            "Disease: {}\nSymptoms: {}\nClinical Signs: {}",
            self.disease, self.symptoms, self.clinical_signs
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PharmaRecord {
    #[serde(rename = "Active Ingredient", default, deserialize_with = "text")]
    pub active_ingredient: String,
    #[serde(rename = "Trade Name", default, deserialize_with = "text")]
    pub trade_name: String,
    #[serde(rename = "Ingredient", default, deserialize_with = "text")]
    pub ingredient: String,
    #[serde(rename = "pharma_info", default)]
    pub info: PharmaInfo,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PharmaInfo {
    /// `species -> free-text rate`, e.g. `"dog" -> "0.2 mg/kg"`.
    #[serde(default, deserialize_with = "section")]
    pub dose_rate: Section,
    #[serde(default, deserialize_with = "text")]
    pub indication: String,
    #[serde(default, deserialize_with = "text")]
    pub contraindication: String,
    #[serde(default, deserialize_with = "text")]
    pub food_timing: String,
    #[serde(default, deserialize_with = "text")]
    pub mechanism_of_action: String,
    #[serde(default, deserialize_with = "text")]
    pub metabolism_and_elimination: String,
    #[serde(default, deserialize_with = "text")]
    pub products: String,
}

impl PharmaRecord {
    /// The three identifying names, in lookup order.
    pub fn names(&self) -> [&str; 3] {
        [&self.active_ingredient, &self.ingredient, &self.trade_name]
    }

    /// Rate text for a species; keys compare case-insensitively.
    pub fn dose_rate_for(&self, species: &str) -> Option<&str> {
        self.info
            .dose_rate
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(species.trim()))
            .map(|(_, v)| v.as_str())
    }

    pub fn to_text(&self) -> String {
        let dose_rate = self
            .info
            .dose_rate
            .iter()
            .map(|(species, rate)| format!("{species}: {rate}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Active Ingredient: {}\nTrade Name: {}\nIngredient: {}\nDose Rate: {}\nIndication: {}\n\
             Contraindication: {}\nFood Timing: {}\nMechanism: {}\nMetabolism and Elimination: {}\nProducts: {}",
            self.active_ingredient,
            self.trade_name,
            self.ingredient,
            dose_rate,
            self.info.indication,
            self.info.contraindication,
            self.info.food_timing,
            self.info.mechanism_of_action,
            self.info.metabolism_and_elimination,
            self.info.products,
        )
    }
}

/// All three corpora, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Corpora {
    pub clinical: Vec<ClinicalCase>,
    pub disease: Vec<DiseaseSheet>,
    pub pharma: Vec<PharmaRecord>,
}

impl Corpora {
    pub fn load(data: &DataSettings) -> crate::error::Result<Self> {
        let corpora = Self {
            clinical: load_records(&data.clinical_path)?,
            disease: load_records(&data.disease_path)?,
            pharma: load_records(&data.pharma_path)?,
        };
        tracing::info!(
            clinical = corpora.clinical.len(),
            disease = corpora.disease.len(),
            pharma = corpora.pharma.len(),
            "loaded corpora"
        );
        Ok(corpora)
    }

    /// Display documents for one domain; ids are record positions.
    pub fn documents(&self, category: Category) -> Vec<Document> {
        match category {
            Category::Clinical => Document::from_texts(category, self.clinical.iter().map(ClinicalCase::to_text)),
            Category::Disease => Document::from_texts(category, self.disease.iter().map(DiseaseSheet::to_text)),
            Category::Pharma => Document::from_texts(category, self.pharma.iter().map(PharmaRecord::to_text)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Reads a corpus file holding either a JSON array or a single object.
pub fn load_records<T>(path: &Path) -> crate::error::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let raw = fs::read_to_string(path).map_err(|e| Error::Corpus(format!("{}: {}", path.display(), e)))?;
    parse_records(&raw).map_err(|e| Error::Corpus(format!("{}: {}", path.display(), e)))
}

pub fn parse_records<T>(raw: &str) -> serde_json::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    Ok(match serde_json::from_str::<OneOrMany<T>>(raw)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

fn push_section(out: &mut String, section: &Section) {
    let lines: Vec<String> = section.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    if !lines.is_empty() {
        out.push_str(&lines.join("\n"));
        out.push('\n');
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(render(&Value::deserialize(de)?))
}

fn optional_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Some(render(&Value::deserialize(de)?)))
}

fn section<'de, D: Deserializer<'de>>(de: D) -> Result<Section, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Object(map) => object_pairs(map),
        Value::Null => Vec::new(),
        other => vec![(String::new(), render(&other))],
    })
}

fn object_pairs(map: Map<String, Value>) -> Section {
    map.into_iter().map(|(k, v)| (k, render(&v))).collect()
}
