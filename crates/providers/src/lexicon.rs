//! Lexicon decorator — rewrites a provider's output with fixed phrase pairs.
//!
//! The secondary model is general-purpose English; its replies are nudged
//! towards the widget's language by swapping a handful of stock phrases.
//! Replacement is plain, case-sensitive substring replacement applied pair
//! by pair in declaration order, so `"no"` also rewrites inside `"know"`.

use async_trait::async_trait;
use chatbridge_core::error::ProviderError;
use chatbridge_core::provider::*;
use std::sync::Arc;

/// Built-in substitution pairs, in application order.
pub const DEFAULT_LEXICON: &[(&str, &str)] = &[
    ("hello", "こんにちは"),
    ("hi", "こんにちは"),
    ("good", "良い"),
    ("thank you", "ありがとう"),
    ("yes", "はい"),
    ("no", "いいえ"),
];

/// An ordered list of `from → to` replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    pairs: Vec<(String, String)>,
}

impl Lexicon {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        // An empty needle would match between every character.
        let pairs = pairs.into_iter().filter(|(from, _)| !from.is_empty()).collect();
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every pair to `text`, in order.
    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(
            DEFAULT_LEXICON
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl From<&[chatbridge_config::SubstitutionConfig]> for Lexicon {
    fn from(subs: &[chatbridge_config::SubstitutionConfig]) -> Self {
        Self::new(
            subs.iter()
                .map(|s| (s.from.clone(), s.to.clone()))
                .collect(),
        )
    }
}

/// Wraps a provider and passes its output through a [`Lexicon`].
pub struct LexiconProvider {
    inner: Arc<dyn chatbridge_core::Provider>,
    lexicon: Lexicon,
}

impl LexiconProvider {
    pub fn new(inner: Arc<dyn chatbridge_core::Provider>, lexicon: Lexicon) -> Self {
        Self { inner, lexicon }
    }
}

#[async_trait]
impl chatbridge_core::Provider for LexiconProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let mut response = self.inner.generate(request).await?;
        response.text = self.lexicon.apply(&response.text);

        if response.text.trim().is_empty() {
            return Err(ProviderError::EmptyOutput);
        }

        Ok(response)
    }
}
