//! Chat service orchestrating transcripts around a model turn.
//!
//! ChatService coordinates the ChatRepository and ProfileRepository: it
//! validates input, creates chats on demand, records the user's message,
//! assembles what the relay needs, and stores the finished reply.

use tracing::{debug, info, warn};

use parlor_types::chat::{ChatIndex, ChatMessage, ChatRecord, Message, MessageRole};
use parlor_types::error::ChatError;

use crate::chat::repository::ChatRepository;
use crate::chat::title::generate_title;
use crate::chat::transcript::TurnTranscript;
use crate::profile::compiler::compile_profile;
use crate::profile::repository::ProfileRepository;

/// Title used when a chat is created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Everything the relay needs for one turn, after the user's message has
/// been stored.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub chat_id: String,
    /// Whether the chat was created by this turn.
    pub created: bool,
    /// Full history including the message just stored.
    pub history: Vec<Message>,
    pub profile_fragment: String,
}

/// Orchestrates chat persistence.
///
/// Generic over `ChatRepository` and `ProfileRepository` so parlor-core
/// never depends on parlor-infra.
pub struct ChatService<C: ChatRepository, P: ProfileRepository> {
    chat_repo: C,
    profile_repo: P,
}

impl<C: ChatRepository, P: ProfileRepository> ChatService<C, P> {
    pub fn new(chat_repo: C, profile_repo: P) -> Self {
        Self {
            chat_repo,
            profile_repo,
        }
    }

    pub async fn list_chats(&self, user_id: &str) -> Result<ChatIndex, ChatError> {
        Ok(ChatIndex(self.chat_repo.get_chats(user_id).await?))
    }

    /// Create an empty chat. A missing or blank title becomes "New Chat".
    pub async fn create_chat(
        &self,
        user_id: &str,
        title: Option<&str>,
    ) -> Result<ChatRecord, ChatError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CHAT_TITLE);
        let chat = self.chat_repo.create_chat(user_id, title).await?;
        info!(user_id = %user_id, chat_id = %chat.id, "Chat created");
        Ok(chat)
    }

    pub async fn get_messages(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.chat_repo.get_messages(user_id, chat_id).await?)
    }

    pub async fn append_message(
        &self,
        user_id: &str,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        self.chat_repo
            .append_message(user_id, chat_id, role, content)
            .await?
            .ok_or(ChatError::NotFound)
    }

    /// Rename a chat. The title is trimmed and must not end up empty.
    pub async fn rename_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        title: &str,
    ) -> Result<String, ChatError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ChatError::EmptyTitle);
        }
        if !self.chat_repo.update_title(user_id, chat_id, title).await? {
            warn!(user_id = %user_id, chat_id = %chat_id, "Attempted to rename non-existent chat");
            return Err(ChatError::NotFound);
        }
        info!(user_id = %user_id, chat_id = %chat_id, "Chat renamed");
        Ok(title.to_string())
    }

    pub async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<(), ChatError> {
        if !self.chat_repo.delete_chat(user_id, chat_id).await? {
            return Err(ChatError::NotFound);
        }
        info!(user_id = %user_id, chat_id = %chat_id, "Chat deleted");
        Ok(())
    }

    pub async fn delete_all_chats(&self, user_id: &str) -> Result<(), ChatError> {
        if !self.chat_repo.delete_all_chats(user_id).await? {
            return Err(ChatError::UserNotFound);
        }
        info!(user_id = %user_id, "All chats deleted");
        Ok(())
    }

    /// Store the user's message and gather the relay input.
    ///
    /// Without a `chat_id` (or with an empty one) a chat is created, titled
    /// from the message. A given `chat_id` must exist.
    pub async fn begin_turn(
        &self,
        user_id: &str,
        chat_id: Option<&str>,
        message: &str,
    ) -> Result<PreparedTurn, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (chat_id, created) = match chat_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                if !self.chat_repo.chat_exists(user_id, id).await? {
                    return Err(ChatError::NotFound);
                }
                (id.to_string(), false)
            }
            None => {
                let chat = self
                    .chat_repo
                    .create_chat(user_id, &generate_title(message))
                    .await?;
                info!(user_id = %user_id, chat_id = %chat.id, "Chat created for new conversation");
                (chat.id, true)
            }
        };

        self.append_message(user_id, &chat_id, MessageRole::User, message)
            .await?;

        let history: Vec<Message> = self
            .chat_repo
            .get_messages(user_id, &chat_id)
            .await?
            .iter()
            .map(Message::from)
            .collect();

        let profile = self.profile_repo.get_profile(user_id).await?;
        let profile_fragment = compile_profile(profile.as_ref());

        debug!(
            user_id = %user_id,
            chat_id = %chat_id,
            history_len = history.len(),
            has_profile = profile.is_some(),
            "Turn prepared"
        );

        Ok(PreparedTurn {
            chat_id,
            created,
            history,
            profile_fragment,
        })
    }

    /// Store the assistant's reply if the turn completed with text.
    pub async fn complete_turn(
        &self,
        user_id: &str,
        chat_id: &str,
        transcript: TurnTranscript,
    ) -> Result<Option<ChatMessage>, ChatError> {
        let chunks = transcript.chunks();
        let Some(reply) = transcript.into_reply() else {
            debug!(user_id = %user_id, chat_id = %chat_id, "No reply to store");
            return Ok(None);
        };
        let saved = self
            .append_message(user_id, chat_id, MessageRole::Assistant, &reply)
            .await?;
        info!(
            user_id = %user_id,
            chat_id = %chat_id,
            chunks,
            chars = reply.chars().count(),
            "Assistant reply stored"
        );
        Ok(Some(saved))
    }
}
