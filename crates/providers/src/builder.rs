//! Builds the inference chain from configuration.
//!
//! ```text
//! hf-primary (target-language model)
//!     └─ on failure → hf-secondary (general model) → lexicon rewrite
//! ```

use std::sync::Arc;

use chatbridge_config::AppConfig;
use chatbridge_core::error::ProviderError;
use tracing::debug;

use crate::fallback::FallbackProvider;
use crate::huggingface::HuggingFaceProvider;
use crate::lexicon::{Lexicon, LexiconProvider};

/// Build the primary → secondary fallback chain described by `config`.
pub fn build_from_config(config: &AppConfig) -> Result<FallbackProvider, ProviderError> {
    let inference = &config.inference;
    let timeout = inference.timeout();

    let primary = HuggingFaceProvider::with_timeout(
        "hf-primary",
        &inference.primary_url,
        inference.api_token.clone(),
        timeout,
    )?;

    let secondary = HuggingFaceProvider::with_timeout(
        "hf-secondary",
        &inference.secondary_url,
        inference.api_token.clone(),
        timeout,
    )?;

    let lexicon = match &inference.substitutions {
        Some(subs) => Lexicon::from(subs.as_slice()),
        None => Lexicon::default(),
    };

    debug!(
        primary = %primary.url(),
        secondary = %secondary.url(),
        substitutions = lexicon.len(),
        "Inference chain configured"
    );

    let secondary = LexiconProvider::new(Arc::new(secondary), lexicon);

    Ok(FallbackProvider::new("huggingface")
        .add(Arc::new(primary), timeout)
        .add(Arc::new(secondary), timeout))
}
