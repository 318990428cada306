//! Case generation services.
//!
//! Generators return raw `(input, expected)` text pairs; turning those into
//! test cases goes through the same normalization as every other source.
//!
//! # Supported Providers
//!
//! - **Gemini** - Google models via API (requires `GEMINI_API_KEY`)
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **Mock** - engine-computed answers, optionally corrupted, no network
//!
//! # Example
//!
//! ```no_run
//! use nextdate::llm::{generated_cases, CaseGenerator, GeminiGenerator};
//!
//! let generator = GeminiGenerator::from_env().unwrap();
//! let batch = generator.generate(50).unwrap();
//! let cases = generated_cases(&batch);
//! println!("{} usable cases", cases.cases.len());
//! ```

mod anthropic;
mod gemini;
mod mock;
mod prompts;
mod provider;
mod retry;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;
pub use mock::MockGenerator;
pub use prompts::{generation_prompt, system_prompt};
pub use provider::{
    build_generator, generated_cases, generated_cases_as, parse_generated_lines, resolve_api_key,
    CaseGenerator, GeneratedBatch, GenerationConfig, ProviderKind,
};
pub use retry::with_retries;
