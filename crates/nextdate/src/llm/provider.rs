//! Case generator trait, configuration, and reply parsing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::calendar::DateConvention;
use crate::error::{NextDateError, Result};
use crate::record::{normalize_rows, Conventions, NormalizedBatch, RawExpected, RawKey, RawRecord, SourceTag};

/// Leading list markers a model sometimes adds: `-`, `*`, `•`, `1.`, `2)`.
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-*•]\s+|\d+[.)]\s+)").unwrap());

/// Configuration shared by generation providers.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model to use; each provider falls back to its own default.
    pub model: Option<String>,

    /// Maximum tokens in the response.
    pub max_tokens: usize,

    /// Sampling temperature (0.0-1.0).
    pub temperature: f64,

    /// Per-request HTTP timeout.
    pub timeout: Duration,

    /// Extra attempts after a transient failure.
    pub max_retries: u32,

    /// Pause between attempts.
    pub retry_backoff: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: 0.2,
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl GenerationConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub(crate) fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

/// Raw `(input, expected)` text pairs returned by a generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBatch {
    pub pairs: Vec<(String, String)>,
    /// One message per non-blank line that was not a pair.
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

/// A source of generated test cases.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait CaseGenerator: Send + Sync {
    /// Request `count` cases.
    fn generate(&self, count: usize) -> Result<GeneratedBatch>;

    /// Get the configuration for this generator.
    fn config(&self) -> &GenerationConfig;

    /// Get the name of this generator (for logging).
    fn name(&self) -> &str;
}

/// Which generator to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Gemini,
    Anthropic,
    Mock,
}

impl ProviderKind {
    /// Environment variable holding this provider's key, if it needs one.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Mock => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use gemini, anthropic, or mock.",
                s
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Mock => "mock",
        };
        f.write_str(name)
    }
}

/// Resolve an API key: flag value, then environment variable, else error.
pub fn resolve_api_key(flag: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(env_var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            NextDateError::MissingCredential(format!("use --api-key or set {}", env_var))
        })
}

/// Build a generator of the given kind.
pub fn build_generator(
    kind: ProviderKind,
    api_key: Option<&str>,
    config: GenerationConfig,
) -> Result<Box<dyn CaseGenerator>> {
    let key = match kind.env_var() {
        Some(var) => Some(resolve_api_key(api_key, var)?),
        None => None,
    };

    match (kind, key) {
        (ProviderKind::Mock, _) => Ok(Box::new(super::MockGenerator::with_config(config))),
        (ProviderKind::Gemini, Some(key)) => {
            Ok(Box::new(super::GeminiGenerator::with_config(key, config)?))
        }
        (ProviderKind::Anthropic, Some(key)) => {
            Ok(Box::new(super::AnthropicGenerator::with_config(key, config)?))
        }
        (_, None) => Err(NextDateError::MissingCredential(format!("{} needs an API key", kind))),
    }
}

pub(crate) fn http_client(config: &GenerationConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| NextDateError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Pass a success response through; turn anything else into [`NextDateError::Api`].
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(NextDateError::Api {
        status: status.as_u16(),
        body: body.chars().take(500).collect(),
    })
}

/// Split a model reply into `(input, expected)` pairs.
///
/// Code fences and blank lines are ignored, list markers are stripped, and
/// a line is kept only if it has exactly two comma-separated fields.
pub fn parse_generated_lines(text: &str) -> GeneratedBatch {
    let mut batch = GeneratedBatch::default();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        let line = LIST_MARKER.replace(line, "");
        let line = line.trim().trim_matches('`');
        let parts: Vec<&str> = line.split(',').collect();

        if parts.len() == 2 {
            batch
                .pairs
                .push((parts[0].trim().to_string(), parts[1].trim().to_string()));
        } else {
            batch.diagnostics.push(format!(
                "line {}: expected 2 comma-separated fields, found {}: '{}'",
                idx + 1,
                parts.len(),
                line
            ));
        }
    }

    batch
}

/// Normalize generated pairs as `generated-suite` cases (`YYYY-MM-DD` on both sides).
pub fn generated_cases(batch: &GeneratedBatch) -> NormalizedBatch {
    generated_cases_as(batch, &SourceTag::generated_suite())
}

/// Like [`generated_cases`] with a caller-chosen tag.
pub fn generated_cases_as(batch: &GeneratedBatch, source: &SourceTag) -> NormalizedBatch {
    let records = batch.pairs.iter().enumerate().map(|(i, (input, expected))| {
        RawRecord::new(RawKey::composite(input.as_str()), RawExpected::text(expected.as_str()))
            .at_row(i + 1)
    });
    normalize_rows(records, source, Conventions::uniform(DateConvention::YearMonthDay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarResult, DateKey};
    use crate::record::Expected;

    #[test]
    fn test_parse_generated_lines() {
        let text = "```csv\n2024-02-28,2024-02-29\n- 2023-02-29,INVALID\n3. 1999-12-31,2000-01-01\n\nHere are your cases:\n2023-01-01,2023-01-02,extra\n```";
        let batch = parse_generated_lines(text);

        assert_eq!(
            batch.pairs,
            vec![
                ("2024-02-28".to_string(), "2024-02-29".to_string()),
                ("2023-02-29".to_string(), "INVALID".to_string()),
                ("1999-12-31".to_string(), "2000-01-01".to_string()),
            ]
        );
        assert_eq!(batch.diagnostics.len(), 2);
        assert!(batch.diagnostics[0].starts_with("line 6:"));
    }

    #[test]
    fn test_generated_cases() {
        let batch = GeneratedBatch {
            pairs: vec![
                ("2024-02-28".into(), "2024-02-29".into()),
                ("2023-02-29".into(), "INVALID".into()),
                ("28/02/2024".into(), "29/02/2024".into()),
            ],
            diagnostics: Vec::new(),
        };
        let cases = generated_cases(&batch);

        assert_eq!(cases.cases.len(), 2);
        assert_eq!(cases.skipped(), 1);
        assert_eq!(cases.cases[0].source, SourceTag::generated_suite());
        assert_eq!(
            cases.cases[0].expected,
            Expected::Label(CalendarResult::Valid(DateKey::new(29, 2, 2024)))
        );
        assert_eq!(cases.diagnostics[0].row, Some(3));
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_resolve_api_key_flag_wins() {
        let key = resolve_api_key(Some("  abc  "), "NEXTDATE_TEST_UNSET_KEY").unwrap();
        assert_eq!(key, "abc");
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let err = resolve_api_key(Some(" "), "NEXTDATE_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, NextDateError::MissingCredential(_)));
        assert!(err.to_string().contains("NEXTDATE_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_build_uses_provider_key() {
        assert_eq!(ProviderKind::Gemini.env_var(), Some("GEMINI_API_KEY"));
        assert_eq!(ProviderKind::Anthropic.env_var(), Some("ANTHROPIC_API_KEY"));
        assert_eq!(ProviderKind::Mock.env_var(), None);

        let gemini =
            build_generator(ProviderKind::Gemini, Some("k"), GenerationConfig::default()).unwrap();
        assert_eq!(gemini.name(), "gemini");
        let anthropic =
            build_generator(ProviderKind::Anthropic, Some("k"), GenerationConfig::default())
                .unwrap();
        assert_eq!(anthropic.name(), "anthropic");
    }

    #[test]
    fn test_build_mock_needs_no_key() {
        let generator =
            build_generator(ProviderKind::Mock, None, GenerationConfig::default()).unwrap();
        assert_eq!(generator.name(), "mock");
    }
}
