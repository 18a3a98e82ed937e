use std::future::Future;
use std::pin::Pin;

use crate::error::ResponderError;
use crate::models::{Message, MessageHistory};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces the next assistant message for a conversation.
///
/// `history` is the full transcript including the just-received human
/// message. Implementations return a message with [`Role::Assistant`].
///
/// [`Role::Assistant`]: crate::models::Role::Assistant
pub trait ChatResponder: Send + Sync {
    fn respond<'a>(
        &'a self,
        history: &'a MessageHistory,
    ) -> BoxFuture<'a, Result<Message, ResponderError>>;
}
