//! Keyword tier — fixed replies for messages that mention a known word.
//!
//! Matching is a case-insensitive *substring* test against the whole
//! message, checked in declaration order: `"hi"` fires inside `"this"`, and
//! `"hello there"` hits `hello` before it can reach `hi`.

use async_trait::async_trait;
use chatbridge_config::KeywordConfig;
use chrono::{DateTime, Local};

use crate::resolver::{ReplySource, ResolutionTier};

/// Built-in keyword table, in match order.
pub const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("hello", "こんにちは！お元気ですか？"),
    ("hi", "こんにちは！何かお手伝いできることはありますか？"),
    ("こんにちは", "こんにちは！素敵な日ですね。"),
    ("おはよう", "おはようございます！今日も良い一日になりそうですね。"),
    ("こんばんは", "こんばんは！お疲れ様でした。"),
    ("元気", "私は元気です！あなたはいかがですか？"),
    ("ありがとう", "どういたしまして！お役に立てて嬉しいです。"),
    ("さようなら", "さようなら！また話しましょう。"),
    ("名前", "私は AI チャットボットです。よろしくお願いします！"),
    ("天気", "天気について具体的な情報は持っていませんが、きっと素敵な天気でしょう！"),
    ("時間", "現在時刻は {time} です。"),
    ("日付", "今日は {date} です。"),
];

/// One keyword and the reply it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    key: String,
    reply: String,
}

impl KeywordRule {
    /// Keys are stored lower-cased so they compare against the lower-cased
    /// message.
    pub fn new(key: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            key: key.into().to_lowercase(),
            reply: reply.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The reply with `{time}` (`HH:MM`) and `{date}` (`YYYY年MM月DD日`)
    /// filled in from `now`.
    pub fn render(&self, now: DateTime<Local>) -> String {
        let mut reply = self.reply.clone();
        if reply.contains("{time}") {
            reply = reply.replace("{time}", &now.format("%H:%M").to_string());
        }
        if reply.contains("{date}") {
            reply = reply.replace("{date}", &now.format("%Y年%m月%d日").to_string());
        }
        reply
    }
}

/// Ordered keyword rules; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl KeywordTable {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Configured rules, or [`DEFAULT_KEYWORDS`] when none are configured.
    pub fn from_config(keywords: Option<&[KeywordConfig]>) -> Self {
        match keywords {
            Some(keywords) => Self::new(
                keywords
                    .iter()
                    .map(|k| KeywordRule::new(&k.key, &k.reply))
                    .collect(),
            ),
            None => Self::default_table(),
        }
    }

    pub fn default_table() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(key, reply)| KeywordRule::new(*key, *reply))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule whose key occurs in the lower-cased message.
    pub fn find(&self, message: &str) -> Option<&KeywordRule> {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| !rule.key.is_empty() && lowered.contains(&rule.key))
    }

    /// Rendered reply for `message` at time `now`, if any keyword matches.
    pub fn lookup_at(&self, message: &str, now: DateTime<Local>) -> Option<String> {
        self.find(message).map(|rule| rule.render(now))
    }
}

#[async_trait]
impl ResolutionTier for KeywordTable {
    fn source(&self) -> ReplySource {
        ReplySource::Keyword
    }

    async fn try_resolve(&self, message: &str) -> Option<String> {
        self.lookup_at(message, Local::now())
    }
}
