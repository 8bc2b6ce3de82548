use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use vetrag_core::traits::AnswerProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent`, deterministic sampling.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self { api_key, model: model.to_string(), client })
    }

    /// Reads the key from `GEMINI_API_KEY`.
    pub fn from_env(model: &str, timeout_secs: u64) -> Result<Self> {
        let key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("Gemini API key not found in environment variables."))?;
        Self::new(key, model, timeout_secs)
    }
}

impl AnswerProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn answer(&self, prompt: &str) -> Result<String> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.trim())])
            .json(&request_body(prompt))
            .send()
            .context("failed to call Gemini generateContent")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Gemini returned {}: {}", status, text);
        }
        let parsed: GenerateResponse = resp.json().context("failed to parse Gemini response")?;
        extract_answer(parsed)
    }
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
        generation_config: GenerationConfig { temperature: 0.0, top_p: 0.95, top_k: 64, max_output_tokens: 8192 },
    }
}

fn extract_answer(parsed: GenerateResponse) -> Result<String> {
    let answer = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();
    let answer = answer.trim();
    if answer.is_empty() {
        bail!("Gemini response missing text content");
    }
    Ok(answer.to_string())
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_deterministic_sampling() {
        let body = serde_json::to_value(request_body("hi")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["topK"], 64);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn parts_are_joined() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Give "},{"text":"2 mg."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_answer(parsed).unwrap(), "Give 2 mg.");
    }

    #[test]
    fn blocked_response_is_an_error() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(extract_answer(parsed).is_err());
    }
}
