//! Canned tier — generic sentences picked at random as the last resort.

use std::sync::Arc;

use rand::Rng;

/// Built-in generic replies.
pub const DEFAULT_CANNED_REPLIES: &[&str] = &[
    "とても興味深いお話ですね。もう少し詳しく教えていただけますか？",
    "なるほど、そうですね。他にも何かお聞きしたいことはありますか？",
    "それについて考えてみますね。どう思われますか？",
    "面白い視点ですね。もう少し詳しく聞かせてください。",
    "そうですね。私も同じように思います。",
    "それは素晴らしいアイデアだと思います！",
    "とても参考になりました。ありがとうございます。",
];

/// Source of the index used to pick a canned reply.
pub trait RandomSource: Send + Sync {
    /// An index in `0..len`. Only called with `len > 0`.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform selection from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// The last-resort reply pool.
#[derive(Clone)]
pub struct CannedPool {
    replies: Vec<String>,
    random: Arc<dyn RandomSource>,
}

impl CannedPool {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .filter(|r| !r.trim().is_empty())
                .collect(),
            random: Arc::new(ThreadRandom),
        }
    }

    /// Configured replies, or [`DEFAULT_CANNED_REPLIES`] when none are configured.
    pub fn from_config(replies: Option<&[String]>) -> Self {
        match replies {
            Some(replies) => Self::new(replies.to_vec()),
            None => Self::default(),
        }
    }

    /// Replace the randomness source (tests use a fixed index).
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// One reply, chosen by the random source. `None` only for an empty pool.
    pub fn pick(&self) -> Option<&str> {
        if self.replies.is_empty() {
            return None;
        }
        let index = self.random.pick(self.replies.len()) % self.replies.len();
        Some(&self.replies[index])
    }
}

impl Default for CannedPool {
    fn default() -> Self {
        Self::new(DEFAULT_CANNED_REPLIES.iter().map(|r| r.to_string()).collect())
    }
}

impl std::fmt::Debug for CannedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CannedPool")
            .field("replies", &self.replies)
            .finish_non_exhaustive()
    }
}
