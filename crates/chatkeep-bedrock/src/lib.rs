//! chatkeep-bedrock
//!
//! Bedrock Converse implementation of the chat responder.

pub mod chat;
pub mod error;
