//! Error types for the chatbridge domain.
//!
//! One `thiserror` enum per bounded context. Provider errors never reach an
//! HTTP client; the remote tier absorbs them and the resolver moves on.

use thiserror::Error;

/// Why a text-generation attempt produced nothing usable.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The model endpoint answered with a non-200 status.
    #[error("inference API returned {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    /// The body was not a JSON array of `{generated_text}` objects.
    #[error("malformed inference payload: {0}")]
    MalformedPayload(String),

    /// Only the echoed prompt, or whitespace, came back.
    #[error("model returned no text beyond the prompt")]
    EmptyOutput,

    #[error("inference not configured: {0}")]
    NotConfigured(String),

    #[error("inference timed out: {0}")]
    Timeout(String),

    #[error("inference transport error: {0}")]
    Network(String),
}

/// Failure of a history backend. The in-memory store never produces one.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Storage(String),
}
