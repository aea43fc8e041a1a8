//! Provider trait — the abstraction over remote text-generation backends.
//!
//! A Provider knows how to send a prompt to a hosted model and get generated
//! text back. Implementations: Hugging Face inference endpoints, the lexicon
//! decorator, and the fallback chain that tries several of them in order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Sampling parameters sent alongside every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum output length in tokens
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Whether to sample at all (greedy decoding when false)
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
}

fn default_max_length() -> u32 {
    100
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_do_sample() -> bool {
    true
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            do_sample: default_do_sample(),
        }
    }
}

/// A single text-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The full prompt, including any speaker prefixes.
    pub prompt: String,

    #[serde(default)]
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            params,
        }
    }
}

/// Generated text with the echoed prompt already removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated continuation, trimmed and never empty.
    pub text: String,

    /// Which model produced it
    pub model: String,
}

/// The core Provider trait.
///
/// The remote resolution tier calls `generate()` without knowing whether it
/// talks to a single endpoint or a whole fallback chain.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "hf-primary").
    fn name(&self) -> &str;

    /// Send a prompt and get generated text back.
    ///
    /// Implementations return `Err(ProviderError::EmptyOutput)` instead of an
    /// empty response, so callers can treat `Ok` as "usable text".
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError>;
}
