use anyhow::Result;

use vetrag_core::config::{LlmSettings, ProviderKind};
use vetrag_core::traits::AnswerProvider;

mod gemini;
mod ollama;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Builds the provider named in the settings.
pub fn provider_from_settings(settings: &LlmSettings) -> Result<Box<dyn AnswerProvider>> {
    match settings.provider {
        ProviderKind::Ollama => Ok(Box::new(OllamaProvider::new(
            &settings.ollama_url,
            &settings.ollama_model,
            settings.timeout_secs,
        )?)),
        ProviderKind::Gemini => Ok(Box::new(GeminiProvider::from_env(&settings.gemini_model, settings.timeout_secs)?)),
    }
}
