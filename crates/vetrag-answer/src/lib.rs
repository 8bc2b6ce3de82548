//! vetrag-answer
//!
//! Turns ranked candidates into a grounded prompt, sends it to a language
//! model provider and packages the reply with its references.

pub mod assistant;
pub mod prompt;
pub mod providers;

pub use assistant::{format_reference, Assistant, Reply};
pub use prompt::{build_prompt, Task};
pub use providers::{provider_from_settings, GeminiProvider, OllamaProvider};
