use chatkeep_core::error::ResponderError;
use chatkeep_storage::error::ConversationStoreError;
use thiserror::Error;

/// Why a turn did not complete cleanly.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("stored conversation is unreadable: {0}")]
    Corrupt(ConversationStoreError),

    #[error("chat responder failed: {0}")]
    Responder(ResponderError),

    /// The turn was answered but could not be persisted.
    #[error("reply was produced but the conversation was not saved: {cause}")]
    NotSaved {
        reply: String,
        cause: ConversationStoreError,
    },
}

impl HandlerError {
    /// The assistant reply, if one was produced before the failure.
    pub fn reply(&self) -> Option<&str> {
        match self {
            HandlerError::NotSaved { reply, .. } => Some(reply),
            _ => None,
        }
    }
}
