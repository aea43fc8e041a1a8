//! Model fallback — try each model once, in order, until one produces text.
//!
//! A stage fails on any provider error, on blank output, or when its attempt
//! outlives the stage's deadline. The chain's error is the last stage's.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatbridge_core::error::ProviderError;
use chatbridge_core::provider::{GenerationRequest, GenerationResponse, Provider};
use tracing::{info, warn};

struct Stage {
    model: Arc<dyn Provider>,
    deadline: Duration,
}

impl Stage {
    async fn attempt(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let response = tokio::time::timeout(self.deadline, self.model.generate(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "{} gave no answer within {}s",
                    self.model.name(),
                    self.deadline.as_secs_f32()
                ))
            })??;

        if response.text.trim().is_empty() {
            return Err(ProviderError::EmptyOutput);
        }
        Ok(response)
    }
}

/// Ordered models behind one [`Provider`].
pub struct FallbackProvider {
    name: String,
    stages: Vec<Stage>,
}

impl FallbackProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a model tried after every model already in the chain.
    pub fn add(mut self, model: Arc<dyn Provider>, deadline: Duration) -> Self {
        self.stages.push(Stage { model, deadline });
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Model names in attempt order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.model.name()).collect()
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let mut failure = ProviderError::NotConfigured(format!("chain '{}' has no models", self.name));

        for (index, stage) in self.stages.iter().enumerate() {
            info!(
                chain = %self.name,
                model = %stage.model.name(),
                attempt = index + 1,
                of = self.stages.len(),
                "Requesting generation"
            );

            match stage.attempt(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(model = %stage.model.name(), error = %e, "Generation attempt failed");
                    failure = e;
                }
            }
        }

        Err(failure)
    }
}
