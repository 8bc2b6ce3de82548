use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use vetrag_core::traits::AnswerProvider;

/// Local Ollama server, non-streaming chat endpoint.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Ollama HTTP client")?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), model: model.to_string(), client })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            stream: false,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        }
    }
}

impl AnswerProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn answer(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&self.request(prompt))
            .send()
            .with_context(|| format!("failed to call Ollama at {url}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Ollama returned {}: {}", status, text);
        }
        let parsed: ChatResponse = resp.json().context("failed to parse Ollama response")?;
        extract_answer(parsed)
    }
}

fn extract_answer(parsed: ChatResponse) -> Result<String> {
    let answer = parsed.message.map(|m| m.content).unwrap_or_default();
    let answer = answer.trim();
    if answer.is_empty() {
        bail!("Ollama response missing message content");
    }
    Ok(answer.to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_is_non_streaming_chat() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.2", 5).unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434");
        let body = serde_json::to_value(provider.request("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3.2",
                "stream": false,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn answer_is_trimmed_message_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"model":"llama3.2","message":{"role":"assistant","content":"  Give 2 mg.\n"},"done":true}"#)
                .unwrap();
        assert_eq!(extract_answer(parsed).unwrap(), "Give 2 mg.");
    }

    #[test]
    fn empty_message_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(extract_answer(parsed).is_err());
    }
}
