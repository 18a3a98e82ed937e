use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid conversation id: {0}")]
    InvalidConversationId(String),
}

/// Failure reported by a [`ChatResponder`](crate::responder::ChatResponder).
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("chat provider error: {0}")]
    Provider(String),

    #[error("chat provider returned an empty response")]
    EmptyResponse,
}
