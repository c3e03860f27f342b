//! ChatRepository trait definition.
//!
//! Chats are keyed by `(user_id, chat_id)`. Absence is a normal outcome and
//! is reported through `Option`/`bool`, never as an error.

use parlor_types::chat::{ChatMessage, ChatRecord, MessageRole};
use parlor_types::error::RepositoryError;

/// Repository trait for chat transcript persistence.
///
/// Implementations live in parlor-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// All chats of a user with their messages, oldest chat first.
    fn get_chats(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatRecord>, RepositoryError>> + Send;

    /// Create an empty chat and return it, including its generated id.
    fn create_chat(
        &self,
        user_id: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<ChatRecord, RepositoryError>> + Send;

    /// Whether the chat exists for this user.
    fn chat_exists(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Append a message to the end of a chat and bump its `updated_at`.
    ///
    /// Returns `None` when the chat does not exist. Appends to one chat are
    /// applied in arrival order.
    fn append_message(
        &self,
        user_id: &str,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, RepositoryError>> + Send;

    /// Messages of a chat in append order. Empty for an unknown chat.
    fn get_messages(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Delete one chat. Returns `false` when it did not exist.
    fn delete_chat(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete every chat of a user. Returns `false` for a user who never
    /// owned a chat.
    fn delete_all_chats(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Replace a chat's title. Returns `false` when the chat does not exist.
    fn update_title(
        &self,
        user_id: &str,
        chat_id: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert a complete chat with its own id and timestamps.
    ///
    /// Returns `false` and leaves the store untouched when a chat with the
    /// same id already exists for the user.
    fn import_chat(
        &self,
        user_id: &str,
        chat: &ChatRecord,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
