//! Conversation history stores for chatbridge.

pub mod in_memory;

pub use in_memory::{DEFAULT_MAX_EXCHANGES, InMemoryHistory};
