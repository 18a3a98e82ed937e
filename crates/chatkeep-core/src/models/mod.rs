pub mod conversation;
pub mod message;

pub use conversation::ConversationId;
pub use message::{Message, MessageHistory, Role};
