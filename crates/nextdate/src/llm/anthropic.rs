//! Anthropic Claude API generator.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{NextDateError, Result};

use super::prompts;
use super::provider::{
    ensure_success, http_client, parse_generated_lines, resolve_api_key, CaseGenerator,
    GeneratedBatch, GenerationConfig,
};
use super::retry::with_retries;

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Claude case generator.
pub struct AnthropicGenerator {
    client: Client,
    api_key: String,
    config: GenerationConfig,
}

impl AnthropicGenerator {
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

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(resolve_api_key(None, "ANTHROPIC_API_KEY")?)
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| NextDateError::Config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Send a message to the Claude API.
    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model_or(DEFAULT_MODEL),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()?;

        let api_response: ApiResponse = ensure_success(response)?.json()?;
        extract_text(api_response)
    }
}

impl CaseGenerator for AnthropicGenerator {
    fn generate(&self, count: usize) -> Result<GeneratedBatch> {
        let prompt = prompts::generation_prompt(count);
        info!(model = self.config.model_or(DEFAULT_MODEL), count, "requesting cases from anthropic");

        let text = with_retries(&self.config, self.name(), || self.send_message(&prompt))?;
        let batch = parse_generated_lines(&text);
        debug!(pairs = batch.pairs.len(), rejected = batch.diagnostics.len(), "parsed anthropic reply");
        Ok(batch)
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

fn extract_text(response: ApiResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find_map(|block| (block.content_type == "text").then_some(block.text))
        .ok_or_else(|| NextDateError::MalformedResponse("No text in API response".to_string()))
}

/// Anthropic API response structure.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}
