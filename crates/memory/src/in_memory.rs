//! In-memory history backend — per-user FIFO transcripts for the life of
//! the process.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chatbridge_core::error::HistoryError;
use chatbridge_core::exchange::Exchange;
use chatbridge_core::history::HistoryBackend;
use tokio::sync::RwLock;
use tracing::debug;

/// Exchanges kept per user unless configured otherwise.
pub const DEFAULT_MAX_EXCHANGES: usize = 10;

/// Stores each user's most recent exchanges in a bounded deque.
///
/// All mutations go through one write lock, so concurrent appends for the
/// same user are serialized and the capacity bound holds after every call.
pub struct InMemoryHistory {
    max_exchanges: usize,
    transcripts: RwLock<HashMap<String, VecDeque<Exchange>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EXCHANGES)
    }

    /// A store keeping at most `max_exchanges` per user (minimum 1).
    pub fn with_capacity(max_exchanges: usize) -> Self {
        Self {
            max_exchanges: max_exchanges.max(1),
            transcripts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryBackend for InMemoryHistory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, user: &str, exchange: Exchange) -> Result<(), HistoryError> {
        let mut transcripts = self.transcripts.write().await;
        let transcript = transcripts.entry(user.to_string()).or_default();

        transcript.push_back(exchange);
        while transcript.len() > self.max_exchanges {
            transcript.pop_front();
        }

        debug!(user, len = transcript.len(), "History appended");
        Ok(())
    }

    async fn get(&self, user: &str) -> Result<Vec<Exchange>, HistoryError> {
        let transcripts = self.transcripts.read().await;
        Ok(transcripts
            .get(user)
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, user: &str) -> Result<(), HistoryError> {
        if self.transcripts.write().await.remove(user).is_some() {
            debug!(user, "History cleared");
        }
        Ok(())
    }

    async fn user_count(&self) -> Result<usize, HistoryError> {
        Ok(self.transcripts.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn exchange(i: usize) -> Exchange {
        Exchange::new(format!("message {i}"), format!("reply {i}"))
    }

    #[tokio::test]
    async fn unknown_user_has_empty_history() {
        let history = InMemoryHistory::new();
        assert!(history.get("nobody").await.unwrap().is_empty());
        assert_eq!(history.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn keeps_last_ten_in_order() {
        for n in [1, 5, 10, 11, 25] {
            let history = InMemoryHistory::new();
            for i in 1..=n {
                history.append("alice", exchange(i)).await.unwrap();
            }

            let stored = history.get("alice").await.unwrap();
            let expected: Vec<Exchange> = (n.saturating_sub(10) + 1..=n).map(exchange).collect();
            assert_eq!(stored, expected, "after {n} appends");
        }
    }

    #[tokio::test]
    async fn eleventh_message_evicts_the_first() {
        let history = InMemoryHistory::new();
        for i in 1..=11 {
            history.append("alice", exchange(i)).await.unwrap();
        }

        let stored = history.get("alice").await.unwrap();
        assert_eq!(stored.len(), 10);
        assert_eq!(stored[0], exchange(2));
        assert_eq!(stored[9], exchange(11));
    }

    #[tokio::test]
    async fn users_are_independent() {
        let history = InMemoryHistory::new();
        history.append("alice", exchange(1)).await.unwrap();
        history.append("bob", exchange(2)).await.unwrap();

        assert_eq!(history.get("alice").await.unwrap(), vec![exchange(1)]);
        assert_eq!(history.get("bob").await.unwrap(), vec![exchange(2)]);
        assert_eq!(history.user_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_then_get_is_empty() {
        let history = InMemoryHistory::new();
        history.append("alice", exchange(1)).await.unwrap();
        history.clear("alice").await.unwrap();

        assert!(history.get("alice").await.unwrap().is_empty());
        assert_eq!(history.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clearing_unknown_user_is_a_no_op() {
        let history = InMemoryHistory::new();
        history.append("alice", exchange(1)).await.unwrap();
        history.clear("bob").await.unwrap();
        assert_eq!(history.get("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn custom_capacity() {
        let history = InMemoryHistory::with_capacity(3);
        for i in 1..=5 {
            history.append("u", exchange(i)).await.unwrap();
        }
        assert_eq!(
            history.get("u").await.unwrap(),
            vec![exchange(3), exchange(4), exchange(5)]
        );

        let floor = InMemoryHistory::with_capacity(0);
        floor.append("u", exchange(1)).await.unwrap();
        floor.append("u", exchange(2)).await.unwrap();
        assert_eq!(floor.get("u").await.unwrap(), vec![exchange(2)]);
    }

    #[tokio::test]
    async fn concurrent_appends_respect_capacity() {
        let history = Arc::new(InMemoryHistory::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let history = history.clone();
            handles.push(tokio::spawn(async move {
                history.append("shared", exchange(i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = history.get("shared").await.unwrap();
        assert_eq!(stored.len(), 10);
        let mut unique = stored.clone();
        unique.dedup();
        assert_eq!(unique.len(), 10);
    }
}
