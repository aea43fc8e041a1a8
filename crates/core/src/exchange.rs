//! A single conversational turn: what the user said and what the bot replied.

use serde::{Deserialize, Serialize};

/// One user message paired with the reply it produced.
///
/// Serialized as `{"user": ..., "bot": ...}`, which is the shape
/// `GET /history/{user}` returns to chat widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The (trimmed) message the user sent.
    #[serde(rename = "user")]
    pub user_message: String,

    /// The reply the resolver produced for it.
    #[serde(rename = "bot")]
    pub bot_reply: String,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, bot_reply: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_reply: bot_reply.into(),
        }
    }
}
