//! Google Gemini API generator.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{NextDateError, Result};

use super::prompts;
use super::provider::{
    ensure_success, http_client, parse_generated_lines, CaseGenerator, GeneratedBatch,
    GenerationConfig,
};
use super::retry::with_retries;

/// Gemini API base; the model and method are appended.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini case generator.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    config: GenerationConfig,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GenerationConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: GenerationConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config)?,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = super::provider::resolve_api_key(None, "GEMINI_API_KEY")?;
        Self::new(api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            API_BASE,
            self.config.model_or(DEFAULT_MODEL)
        )
    }

    fn send_prompt(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        let api_response: ApiResponse = ensure_success(response)?.json()?;
        extract_text(api_response)
    }
}

impl CaseGenerator for GeminiGenerator {
    fn generate(&self, count: usize) -> Result<GeneratedBatch> {
        let prompt = prompts::generation_prompt(count);
        info!(model = self.config.model_or(DEFAULT_MODEL), count, "requesting cases from gemini");

        let text = with_retries(&self.config, self.name(), || self.send_prompt(&prompt))?;
        let batch = parse_generated_lines(&text);
        debug!(pairs = batch.pairs.len(), rejected = batch.diagnostics.len(), "parsed gemini reply");
        Ok(batch)
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Take the first candidate's first text part.
fn extract_text(response: ApiResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| NextDateError::MalformedResponse("no text in Gemini candidates".to_string()))
}

/// Gemini generateContent response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"2024-02-28,2024-02-29"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "2024-02-28,2024-02-29");
    }

    #[test]
    fn test_extract_text_missing() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(NextDateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_endpoint_uses_model() {
        let generator =
            GeminiGenerator::with_config("k", GenerationConfig::default().with_model("gemini-1.5-pro"))
                .unwrap();
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
