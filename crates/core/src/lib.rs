//! # chatbridge core
//!
//! Domain types, traits, and error definitions for the chatbridge backend.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the provider, memory, agent and gateway crates implement against.
//!
//! Every seam is a trait here:
//! - [`Provider`] — a remote text-generation backend
//! - [`HistoryBackend`] — the per-user transcript store

pub mod error;
pub mod exchange;
pub mod history;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{HistoryError, ProviderError};
pub use exchange::Exchange;
pub use history::HistoryBackend;
pub use provider::{GenerationParams, GenerationRequest, GenerationResponse, Provider};
