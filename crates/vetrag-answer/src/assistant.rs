use anyhow::Result;

use vetrag_core::traits::AnswerProvider;
use vetrag_core::{CandidateScore, Category};
use vetrag_hybrid::{is_dose_request, RetrievalService};

use crate::prompt::{build_prompt, Task};

/// Final answer plus the records it was grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub category: Category,
    pub response: String,
    pub reference: String,
}

/// Retrieval followed by answer synthesis.
pub struct Assistant<'a> {
    service: &'a RetrievalService,
    provider: &'a dyn AnswerProvider,
}

impl<'a> Assistant<'a> {
    pub fn new(service: &'a RetrievalService, provider: &'a dyn AnswerProvider) -> Self {
        Self { service, provider }
    }

    /// Answers `query`. The domain is taken from `domain`, then from the task,
    /// then from the classifier. Dose requests are answered by the resolver
    /// without calling the model.
    pub fn ask(&self, query: &str, domain: Option<Category>, task: Task) -> Result<Reply> {
        if task == Task::CalculateDoseRate || is_dose_request(query) {
            let outcome = self.service.resolve_dose(query);
            return Ok(Reply {
                category: Category::Pharma,
                response: outcome.response(),
                reference: outcome.reference(),
            });
        }

        let search = self.service.search(query, domain.or_else(|| task.category()))?;
        let category = search.category;
        let Some(best) = search.candidates.first() else {
            return Ok(Reply {
                category,
                response: format!("No relevant {category} data found."),
                reference: String::new(),
            });
        };

        let prompt = build_prompt(category, task, query, &best.text);
        tracing::debug!(provider = self.provider.name(), %category, %task, "asking model");
        let response = self.provider.answer(&prompt)?;
        Ok(Reply { category, response, reference: format_reference(&search.candidates) })
    }
}

/// `Match 1:\n<text>\n\nMatch 2:\n<text>...`
pub fn format_reference(candidates: &[CandidateScore]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Match {}:\n{}", i + 1, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
