//! Chat message types.
//!
//! This module contains the transcript entry type, its role, and the id
//! generator that keeps ids strictly increasing within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Millisecond-based message identifier.
pub type MessageId = u64;

/// Represents the author of a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    /// Message typed by the shopper.
    User,
    /// Reply produced by the AI assistant.
    Assistant,
}

/// A single transcript entry.
///
/// The id is written as a decimal string and read back from either a
/// string or a number, so transcripts saved by older builds still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(serialize_with = "id_to_string", deserialize_with = "id_from_any")]
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, ChatRole::User, content)
    }

    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, ChatRole::Assistant, content)
    }

    fn new(id: MessageId, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}

fn id_to_string<S>(id: &MessageId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&id.to_string())
}

fn id_from_any<'de, D>(deserializer: D) -> Result<MessageId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Issues strictly increasing message ids.
///
/// Ids follow the wall clock in milliseconds, but two ids issued within the
/// same millisecond (or after a clock step backwards) still come out in
/// order: the next id is `max(now_ms, last + 1)`.
#[derive(Debug, Default, Clone)]
pub struct MessageIdGenerator {
    last: MessageId,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts issuing after `last`, typically the largest id of a loaded transcript.
    pub fn seeded(last: MessageId) -> Self {
        Self { last }
    }

    pub fn next_id(&mut self) -> MessageId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        self.next_at(now)
    }

    pub fn next_at(&mut self, now_ms: u64) -> MessageId {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase_within_one_millisecond() {
        let mut ids = MessageIdGenerator::new();
        let user = ids.next_at(1_700_000_000_000);
        let assistant = ids.next_at(1_700_000_000_000);
        assert!(assistant > user);
    }

    #[test]
    fn test_ids_survive_clock_going_backwards() {
        let mut ids = MessageIdGenerator::seeded(500);
        assert_eq!(ids.next_at(100), 501);
        assert_eq!(ids.next_at(900), 900);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let message = ChatMessage::assistant(42, "hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["id"], "42");
        assert_eq!(ChatRole::User.to_string(), "user");
    }

    #[test]
    fn test_decodes_legacy_string_and_numeric_ids() {
        let legacy = r#"{"id":"1717000000000","role":"user","content":"hi","timestamp":"2024-05-29T16:26:40.000Z"}"#;
        let numeric = r#"{"id":1717000000001,"role":"assistant","content":"hello","timestamp":"2024-05-29T16:26:41.000Z"}"#;

        let first: ChatMessage = serde_json::from_str(legacy).unwrap();
        let second: ChatMessage = serde_json::from_str(numeric).unwrap();
        assert_eq!(first.id, 1_717_000_000_000);
        assert!(first.is_user());
        assert_eq!(second.role, ChatRole::Assistant);
        assert!(second.id > first.id);
    }
}
