//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parlor-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool and every mutation on the single-connection writer.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use parlor_core::chat::repository::ChatRepository;
use parlor_types::chat::{ChatMessage, ChatRecord, MessageRole};
use parlor_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_record(self, messages: Vec<ChatMessage>) -> Result<ChatRecord, RepositoryError> {
        Ok(ChatRecord {
            id: self.id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            messages,
        })
    }
}

struct MessageRow {
    chat_id: String,
    role: String,
    content: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(ChatMessage {
            role,
            content: self.content,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn get_chats(&self, user_id: &str) -> Result<Vec<ChatRecord>, RepositoryError> {
        let chat_rows = sqlx::query(
            "SELECT id, title, created_at, updated_at FROM chats
             WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let message_rows = sqlx::query(
            "SELECT chat_id, role, content, timestamp FROM chat_messages
             WHERE user_id = ? ORDER BY chat_id, seq ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut by_chat: HashMap<String, Vec<ChatMessage>> = HashMap::new();
        for row in &message_rows {
            let row = MessageRow::from_row(row).map_err(query_error)?;
            let chat_id = row.chat_id.clone();
            by_chat.entry(chat_id).or_default().push(row.into_message()?);
        }

        let mut chats = Vec::with_capacity(chat_rows.len());
        for row in &chat_rows {
            let row = ChatRow::from_row(row).map_err(query_error)?;
            let messages = by_chat.remove(&row.id).unwrap_or_default();
            chats.push(row.into_record(messages)?);
        }
        Ok(chats)
    }

    async fn create_chat(&self, user_id: &str, title: &str) -> Result<ChatRecord, RepositoryError> {
        let now = Utc::now();
        let chat = ChatRecord {
            id: Uuid::now_v7().to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query("INSERT OR IGNORE INTO chat_owners (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(format_datetime(&now))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        sqlx::query(
            "INSERT INTO chats (user_id, id, title, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&chat.id)
        .bind(&chat.title)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!("chat {} already exists", chat.id));
                }
            }
            query_error(e)
        })?;

        tx.commit().await.map_err(query_error)?;
        Ok(chat)
    }

    async fn chat_exists(&self, user_id: &str, chat_id: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM chats WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.is_some())
    }

    async fn append_message(
        &self,
        user_id: &str,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Option<ChatMessage>, RepositoryError> {
        let message = ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        let timestamp = format_datetime(&message.timestamp);

        // The writer pool has one connection, so this transaction also
        // serializes concurrent appends to the same chat.
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let touched = sqlx::query("UPDATE chats SET updated_at = ? WHERE user_id = ? AND id = ?")
            .bind(&timestamp)
            .bind(user_id)
            .bind(chat_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO chat_messages (user_id, chat_id, seq, role, content, timestamp)
             VALUES (?, ?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM chat_messages
                            WHERE user_id = ? AND chat_id = ?), ?, ?, ?)",
        )
        .bind(user_id)
        .bind(chat_id)
        .bind(user_id)
        .bind(chat_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(Some(message))
    }

    async fn get_messages(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT chat_id, role, content, timestamp FROM chat_messages
             WHERE user_id = ? AND chat_id = ? ORDER BY seq ASC",
        )
        .bind(user_id)
        .bind(chat_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(chat_id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_chats(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let owner = sqlx::query("SELECT 1 FROM chat_owners WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        if owner.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM chats WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }

    async fn update_title(
        &self,
        user_id: &str,
        chat_id: &str,
        title: &str,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE chats SET title = ?, updated_at = ? WHERE user_id = ? AND id = ?")
                .bind(title)
                .bind(format_datetime(&Utc::now()))
                .bind(user_id)
                .bind(chat_id)
                .execute(&self.pool.writer)
                .await
                .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn import_chat(&self, user_id: &str, chat: &ChatRecord) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query("INSERT OR IGNORE INTO chat_owners (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(format_datetime(&chat.created_at))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO chats (user_id, id, title, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&chat.id)
        .bind(&chat.title)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        for (seq, message) in chat.messages.iter().enumerate() {
            sqlx::query(
                "INSERT INTO chat_messages (user_id, chat_id, seq, role, content, timestamp)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(&chat.id)
            .bind(seq as i64 + 1)
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(format_datetime(&message.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }
}
