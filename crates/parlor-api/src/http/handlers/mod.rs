pub mod chat;
pub mod chats;
pub mod profile;
pub mod prompts;
