//! Title generation for implicitly created chats.

/// Longest message, in characters, used verbatim as a title.
pub const MAX_TITLE_CHARS: usize = 30;

const TRUNCATED_CHARS: usize = 27;

/// Derive a chat title from its first user message.
///
/// Messages of up to 30 characters become the title as-is. Longer ones are
/// cut to their first 27 characters followed by `...`. Lengths count
/// characters, not bytes.
pub fn generate_title(message: &str) -> String {
    if message.chars().count() <= MAX_TITLE_CHARS {
        return message.to_string();
    }
    let mut title: String = message.chars().take(TRUNCATED_CHARS).collect();
    title.push_str("...");
    title
}
