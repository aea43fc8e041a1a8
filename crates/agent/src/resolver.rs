//! The resolver — runs the tiers in order and stops at the first reply.

use std::sync::Arc;

use async_trait::async_trait;
use chatbridge_config::AppConfig;
use chatbridge_core::provider::Provider;
use tracing::{debug, error};

use crate::canned::{CannedPool, RandomSource};
use crate::keyword::KeywordTable;
use crate::remote::RemoteTier;

/// Reply used when no tier, not even the canned pool, can answer.
pub const APOLOGY: &str =
    "申し訳ございません。うまく理解できませんでした。もう一度お話しいただけますか？";

/// Which stage of the chain produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Keyword,
    Remote,
    Canned,
    Apology,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Remote => "remote",
            Self::Canned => "canned",
            Self::Apology => "apology",
        }
    }
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved reply and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub reply: String,
    pub source: ReplySource,
}

/// One fallible stage in the chain.
#[async_trait]
pub trait ResolutionTier: Send + Sync {
    fn source(&self) -> ReplySource;

    /// A reply for `message`, or `None` to pass to the next tier.
    async fn try_resolve(&self, message: &str) -> Option<String>;
}

/// Ordered fallible tiers followed by the canned pool.
pub struct ResponseResolver {
    tiers: Vec<Arc<dyn ResolutionTier>>,
    canned: CannedPool,
}

impl ResponseResolver {
    /// A resolver with no fallible tiers; add them with [`Self::with_tier`].
    pub fn new(canned: CannedPool) -> Self {
        Self {
            tiers: Vec::new(),
            canned,
        }
    }

    /// Append a tier; tiers are tried in the order they were added.
    pub fn with_tier(mut self, tier: Arc<dyn ResolutionTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    /// keyword → remote → canned, as configured.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let keywords = KeywordTable::from_config(config.responder.keywords.as_deref());
        let remote = RemoteTier::new(
            provider,
            config.inference.prompt_template.clone(),
            config.inference.generation_params(),
        );
        let canned = CannedPool::from_config(config.responder.canned.as_deref());

        if canned.is_empty() {
            error!("Canned pool is empty; unmatched messages will get the apology reply");
        }

        Self::new(canned)
            .with_tier(Arc::new(keywords))
            .with_tier(Arc::new(remote))
    }

    /// Swap the canned pool's randomness source.
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.canned = self.canned.with_random_source(random);
        self
    }

    /// Resolve a reply. Never fails; the reply is never empty.
    pub async fn resolve(&self, message: &str) -> Resolution {
        for tier in &self.tiers {
            if let Some(reply) = tier.try_resolve(message).await {
                if !reply.trim().is_empty() {
                    debug!(source = %tier.source(), "Reply resolved");
                    return Resolution {
                        reply,
                        source: tier.source(),
                    };
                }
            }
        }

        match self.canned.pick() {
            Some(reply) => Resolution {
                reply: reply.to_string(),
                source: ReplySource::Canned,
            },
            None => Resolution {
                reply: APOLOGY.to_string(),
                source: ReplySource::Apology,
            },
        }
    }
}
