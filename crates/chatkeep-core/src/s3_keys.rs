//! S3 key/path conventions.
//!
//! Pure string functions — no AWS SDK dependency. These define the canonical
//! layout of objects in the chatkeep bucket.

use crate::models::ConversationId;

pub const CONVERSATION_SUFFIX: &str = ".json";

/// Object key holding the full transcript of one conversation.
pub fn conversation(id: &ConversationId) -> String {
    format!("{}{CONVERSATION_SUFFIX}", id.as_str())
}

pub const CONTENT_TYPE_JSON: &str = "application/json";
