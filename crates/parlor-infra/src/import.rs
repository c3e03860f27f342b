//! Import of the legacy flat-file data set.
//!
//! Earlier deployments kept everything in three JSON files:
//!
//! - `chat_history.json`: `{user_id: {chat_id: {title, created_at, updated_at, messages}}}`
//! - `profiles.json`: `{user_id: {field: value, ...}}`
//! - `prompts.json`: `{category: [prompt, ...]}`
//!
//! Missing files are skipped. Chats that already exist are left alone,
//! profiles are upserted and the prompt catalog is only seeded into an
//! empty table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use parlor_core::chat::repository::ChatRepository;
use parlor_core::profile::repository::ProfileRepository;
use parlor_core::prompt::repository::PromptRepository;
use parlor_types::chat::{ChatMessage, ChatRecord, MessageRole};
use parlor_types::error::RepositoryError;
use parlor_types::profile::{ProfileFields, strip_reserved};
use parlor_types::prompt::PromptCatalog;

pub const CHAT_HISTORY_FILE: &str = "chat_history.json";
pub const PROFILES_FILE: &str = "profiles.json";
pub const PROMPTS_FILE: &str = "prompts.json";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What an import run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub chats_imported: usize,
    pub chats_skipped: usize,
    pub messages_imported: usize,
    pub profiles_imported: usize,
    pub prompts_seeded: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyChat {
    #[serde(default)]
    title: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    messages: Vec<LegacyMessage>,
}

#[derive(Debug, Deserialize)]
struct LegacyMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
}

type LegacyHistory = BTreeMap<String, BTreeMap<String, LegacyChat>>;

/// Import every legacy file found in `dir`.
pub async fn import_legacy<C, P, R>(
    dir: &Path,
    chats: &C,
    profiles: &P,
    prompts: &R,
) -> Result<ImportSummary, ImportError>
where
    C: ChatRepository,
    P: ProfileRepository,
    R: PromptRepository,
{
    let mut summary = ImportSummary::default();

    if let Some(history) = read_json::<LegacyHistory>(&dir.join(CHAT_HISTORY_FILE)).await? {
        import_chats(history, chats, &mut summary).await?;
    }

    if let Some(users) =
        read_json::<BTreeMap<String, ProfileFields>>(&dir.join(PROFILES_FILE)).await?
    {
        for (user_id, fields) in users {
            profiles
                .create_profile(&user_id, &strip_reserved(fields))
                .await?;
            summary.profiles_imported += 1;
        }
    }

    if let Some(catalog) = read_json::<PromptCatalog>(&dir.join(PROMPTS_FILE)).await? {
        summary.prompts_seeded = prompts.seed_catalog(&catalog).await?;
    }

    tracing::info!(
        chats = summary.chats_imported,
        skipped = summary.chats_skipped,
        profiles = summary.profiles_imported,
        prompts_seeded = summary.prompts_seeded,
        "Legacy import finished"
    );
    Ok(summary)
}

async fn import_chats<C: ChatRepository>(
    history: LegacyHistory,
    chats: &C,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    for (user_id, user_chats) in history {
        let mut records: Vec<ChatRecord> = user_chats
            .into_iter()
            .map(|(id, chat)| convert_chat(id, chat))
            .collect();
        // Keep the original creation order.
        records.sort_by_key(|r| r.created_at);

        for record in records {
            if chats.import_chat(&user_id, &record).await? {
                summary.chats_imported += 1;
                summary.messages_imported += record.messages.len();
            } else {
                tracing::debug!(user_id = %user_id, chat_id = %record.id, "Chat already exists, skipping");
                summary.chats_skipped += 1;
            }
        }
    }
    Ok(())
}

fn convert_chat(id: String, chat: LegacyChat) -> ChatRecord {
    let created_at = parse_legacy_timestamp(chat.created_at.as_deref());
    let updated_at = chat
        .updated_at
        .as_deref()
        .map(|s| parse_legacy_timestamp(Some(s)))
        .unwrap_or(created_at);

    let messages = chat
        .messages
        .into_iter()
        .filter_map(|m| match m.role.parse::<MessageRole>() {
            Ok(role) => Some(ChatMessage {
                role,
                content: m.content,
                timestamp: parse_legacy_timestamp(m.timestamp.as_deref()),
            }),
            Err(_) => {
                tracing::warn!(chat_id = %id, role = %m.role, "Dropping message with unknown role");
                None
            }
        })
        .collect();

    ChatRecord {
        id,
        title: chat.title,
        created_at,
        updated_at,
        messages,
    }
}

/// Legacy timestamps are RFC 3339 or naive local ISO strings; naive ones
/// are read as UTC. Anything unreadable becomes the current time.
fn parse_legacy_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Utc::now();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    tracing::warn!(timestamp = raw, "Unreadable legacy timestamp, using now");
    Utc::now()
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ImportError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, skipping", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ImportError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ImportError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
