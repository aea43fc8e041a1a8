//! History trait — the per-user transcript store.
//!
//! The gateway appends one [`Exchange`] per resolved chat message and serves
//! the stored transcript back on request. Implementations must keep each
//! user's transcript in insertion order and bounded by their capacity.

use async_trait::async_trait;

use crate::error::HistoryError;
use crate::exchange::Exchange;

#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Append an exchange to `user`'s transcript, creating it if absent and
    /// evicting the oldest entries beyond capacity.
    async fn append(&self, user: &str, exchange: Exchange) -> Result<(), HistoryError>;

    /// The stored transcript for `user`, oldest first. Unknown users yield
    /// an empty vector.
    async fn get(&self, user: &str) -> Result<Vec<Exchange>, HistoryError>;

    /// Drop `user`'s transcript. Clearing an unknown user is not an error.
    async fn clear(&self, user: &str) -> Result<(), HistoryError>;

    /// Number of users with a stored transcript.
    async fn user_count(&self) -> Result<usize, HistoryError>;
}
