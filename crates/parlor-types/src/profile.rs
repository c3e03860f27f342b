//! User profile types.
//!
//! A profile is a free-form bag of JSON fields, one per user. A handful of
//! well-known keys (`name`, `age`, `goals`, `ai_tone`, ...) feed the system
//! prompt; anything else is stored and returned untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Free-form profile fields.
pub type ProfileFields = serde_json::Map<String, serde_json::Value>;

/// Keys owned by the store, never persisted as profile fields.
pub const RESERVED_KEYS: [&str; 3] = ["user_id", "created_at", "updated_at"];

/// Profile key selecting the response tone.
pub const TONE_KEY: &str = "ai_tone";

/// A user's profile record.
///
/// Serializes flat: the stored fields followed by the two timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    #[serde(skip)]
    pub user_id: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Look up a field, treating JSON null as absent.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// The tone selected by the profile, falling back to the default for
    /// missing or unrecognized values.
    pub fn tone(&self) -> Tone {
        self.field(TONE_KEY)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Drop the store-owned keys from incoming profile data.
pub fn strip_reserved(mut fields: ProfileFields) -> ProfileFields {
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
    fields
}

/// Response tone requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
    Humorous,
    Motivational,
    Empathetic,
    Concise,
    Detailed,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Casual,
        Tone::Humorous,
        Tone::Motivational,
        Tone::Empathetic,
        Tone::Concise,
        Tone::Detailed,
    ];

    /// The instruction sentence appended to the system prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            Tone::Professional => {
                "Respond in a formal, business-like manner with complete sentences and proper grammar."
            }
            Tone::Friendly => "Respond in a warm, approachable way, as if talking to a friend.",
            Tone::Casual => {
                "Respond in a relaxed, informal way, using casual language and contractions."
            }
            Tone::Humorous => {
                "Respond with a light-hearted, funny tone, including jokes or witty remarks when appropriate."
            }
            Tone::Motivational => {
                "Respond in an encouraging, uplifting way, providing positive reinforcement and motivation."
            }
            Tone::Empathetic => {
                "Respond with understanding and compassion, showing that you care about the user's feelings."
            }
            Tone::Concise => "Keep responses brief and to the point, avoiding unnecessary details.",
            Tone::Detailed => {
                "Provide thorough, detailed responses with explanations and examples when helpful."
            }
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
            Tone::Humorous => "humorous",
            Tone::Motivational => "motivational",
            Tone::Empathetic => "empathetic",
            Tone::Concise => "concise",
            Tone::Detailed => "detailed",
        };
        f.write_str(name)
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.to_string() == s)
            .ok_or_else(|| format!("invalid tone: '{s}'"))
    }
}
