//! Remote tier — asks the inference chain to continue a short dialogue.
//!
//! Every failure mode of the provider (transport, timeout, bad status,
//! malformed or empty output) ends the tier with `None`; nothing is
//! propagated to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chatbridge_core::provider::{GenerationParams, GenerationRequest, Provider};
use tracing::{debug, warn};

use crate::resolver::{ReplySource, ResolutionTier};

pub struct RemoteTier {
    provider: Arc<dyn Provider>,
    prompt_template: String,
    params: GenerationParams,
}

impl RemoteTier {
    /// `prompt_template` must contain `{message}`, e.g. `"ユーザー: {message}\nAI: "`.
    pub fn new(
        provider: Arc<dyn Provider>,
        prompt_template: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            provider,
            prompt_template: prompt_template.into(),
            params,
        }
    }

    pub fn build_prompt(&self, message: &str) -> String {
        self.prompt_template.replace("{message}", message)
    }

    /// Generated text for `message`, or `None` if the chain produced nothing usable.
    pub async fn infer(&self, message: &str) -> Option<String> {
        let request = GenerationRequest::new(self.build_prompt(message), self.params);

        match self.provider.generate(request).await {
            Ok(response) if !response.text.trim().is_empty() => {
                debug!(model = %response.model, "Remote tier answered");
                Some(response.text)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Remote inference failed");
                None
            }
        }
    }
}

#[async_trait]
impl ResolutionTier for RemoteTier {
    fn source(&self) -> ReplySource {
        ReplySource::Remote
    }

    async fn try_resolve(&self, message: &str) -> Option<String> {
        self.infer(message).await
    }
}
