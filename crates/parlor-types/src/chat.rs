//! Chat transcript types.
//!
//! A chat is owned by one user and holds an append-only sequence of
//! messages. Chat ids are opaque strings, unique per user.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

/// Role of a message in a conversation.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant', 'system'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A role/content pair as sent to the model server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A stored message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for Message {
    fn from(m: &ChatMessage) -> Self {
        Message::new(m.role, m.content.clone())
    }
}

/// A titled conversation with its messages in append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// All chats of one user.
///
/// Serializes as a JSON object keyed by chat id, in the order the chats
/// were listed (creation order from the repository).
#[derive(Debug, Clone, Default)]
pub struct ChatIndex(pub Vec<ChatRecord>);

#[derive(Serialize)]
struct ChatEntry<'a> {
    title: &'a str,
    created_at: &'a DateTime<Utc>,
    updated_at: &'a DateTime<Utc>,
    messages: &'a [ChatMessage],
}

impl Serialize for ChatIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for chat in &self.0 {
            map.serialize_entry(
                &chat.id,
                &ChatEntry {
                    title: &chat.title,
                    created_at: &chat.created_at,
                    updated_at: &chat.updated_at,
                    messages: &chat.messages,
                },
            )?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_parse_is_case_insensitive() {
        assert_eq!("Assistant".parse::<MessageRole>().unwrap(), MessageRole::Assistant);
        assert!("tool".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_serializes_role_lowercase() {
        let json = serde_json::to_value(Message::new(MessageRole::User, "hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_chat_index_keys_by_id_in_order() {
        let now = Utc::now();
        let chat = |id: &str| ChatRecord {
            id: id.to_string(),
            title: format!("title {id}"),
            created_at: now,
            updated_at: now,
            messages: vec![],
        };
        let index = ChatIndex(vec![chat("zeta"), chat("alpha")]);
        let json = serde_json::to_string(&index).unwrap();

        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha, "listing order must be preserved: {json}");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["alpha"]["title"], "title alpha");
        assert!(value["alpha"].get("id").is_none());
        assert!(value["alpha"]["messages"].as_array().unwrap().is_empty());
    }
}
