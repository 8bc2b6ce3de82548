//! Prompt templates per domain and task.

use std::fmt;
use std::str::FromStr;

use vetrag_core::{Category, Error};

/// What the caller wants done with the retrieved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    General,
    // clinical
    Synonym,
    DiagnosticWorkup,
    DrugOfChoice,
    DifferentialDiagnosis,
    LineOfTreatment,
    Prognosis,
    // disease
    DescribeClinicalSigns,
    Symptoms,
    ReverseSymptomLookup,
    // pharma
    CalculateDoseRate,
    Indication,
    Contraindication,
    MechanismOfAction,
    MetabolismAndElimination,
    Products,
}

impl Task {
    pub const ALL: [Task; 16] = [
        Task::General,
        Task::Synonym,
        Task::DiagnosticWorkup,
        Task::DrugOfChoice,
        Task::DifferentialDiagnosis,
        Task::LineOfTreatment,
        Task::Prognosis,
        Task::DescribeClinicalSigns,
        Task::Symptoms,
        Task::ReverseSymptomLookup,
        Task::CalculateDoseRate,
        Task::Indication,
        Task::Contraindication,
        Task::MechanismOfAction,
        Task::MetabolismAndElimination,
        Task::Products,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Task::General => "general",
            Task::Synonym => "synonym",
            Task::DiagnosticWorkup => "diagnostic_workup",
            Task::DrugOfChoice => "drug_of_choice",
            Task::DifferentialDiagnosis => "differential_diagnosis",
            Task::LineOfTreatment => "line_of_treatment",
            Task::Prognosis => "prognosis",
            Task::DescribeClinicalSigns => "describe_clinical_signs",
            Task::Symptoms => "symptoms",
            Task::ReverseSymptomLookup => "reverse_symptom_lookup",
            Task::CalculateDoseRate => "calculate_dose_rate",
            Task::Indication => "indication",
            Task::Contraindication => "contraindication",
            Task::MechanismOfAction => "mechanism_of_action",
            Task::MetabolismAndElimination => "metabolism_and_elimination",
            Task::Products => "products",
        }
    }

    /// Domain the task belongs to; `None` for the general task.
    pub fn category(self) -> Option<Category> {
        match self {
            Task::General => None,
            Task::Synonym
            | Task::DiagnosticWorkup
            | Task::DrugOfChoice
            | Task::DifferentialDiagnosis
            | Task::LineOfTreatment
            | Task::Prognosis => Some(Category::Clinical),
            Task::DescribeClinicalSigns | Task::Symptoms | Task::ReverseSymptomLookup => Some(Category::Disease),
            Task::CalculateDoseRate
            | Task::Indication
            | Task::Contraindication
            | Task::MechanismOfAction
            | Task::MetabolismAndElimination
            | Task::Products => Some(Category::Pharma),
        }
    }

    /// Instruction sentence for `category`. A task from another domain falls
    /// back to that domain's generic instruction.
    pub fn instruction(self, category: Category) -> &'static str {
        if self.category() != Some(category) {
            return match category {
                Category::Clinical => "Answer the query based on the clinical data.",
                Category::Disease => "Answer the query based on the disease symptoms.",
                Category::Pharma => "Answer the query based on the pharmaceutical data.",
            };
        }
        match self {
            Task::Synonym => "Provide synonyms for the disease mentioned in the clinical data.",
            Task::DiagnosticWorkup => "Summarize the diagnostic workup from the clinical data.",
            Task::DrugOfChoice => "Identify the drug of choice for the condition in the clinical data.",
            Task::DifferentialDiagnosis => "List the differential diagnoses based on the clinical data.",
            Task::LineOfTreatment => "Describe the recommended line of treatment from the clinical data.",
            Task::Prognosis => "Describe the prognosis based on the clinical data.",
            Task::DescribeClinicalSigns => "Describe the clinical signs associated with the disease symptoms.",
            Task::Symptoms => "List the symptoms mentioned in the disease data.",
            Task::ReverseSymptomLookup => {
                "Perform a reverse lookup for the given symptom to identify possible diseases."
            }
            Task::CalculateDoseRate => "Calculate the dose rate for the medication based on the provided parameters.",
            Task::Indication => "Describe the indication for the medication.",
            Task::Contraindication => "List the contraindications for the medication.",
            Task::MechanismOfAction => "Describe the mechanism of action of the medication.",
            Task::MetabolismAndElimination => "Describe the metabolism and elimination of the medication.",
            Task::Products => "List the products that contain this medication.",
            Task::General => "Answer the query.",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        if wanted == "default" {
            return Ok(Task::General);
        }
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::NotFound(format!("unknown task '{s}'")))
    }
}

fn data_labels(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Clinical => ("clinical data", "Clinical Data"),
        Category::Disease => ("disease symptoms data", "Disease Symptoms Data"),
        Category::Pharma => ("pharmaceutical data", "Pharmaceutical Data"),
    }
}

/// Grounded prompt asking the model to answer from `context` only.
pub fn build_prompt(category: Category, task: Task, query: &str, context: &str) -> String {
    let (inline, heading) = data_labels(category);
    format!(
        "You are a veterinarian. Based solely on the following {inline}, {}\nQuery: {query}\n\n{heading}:\n{context}\n\nAnswer:",
        task.instruction(category)
    )
}
