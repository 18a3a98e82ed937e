//! chatkeep-core
//!
//! Pure domain types, the chat responder seam, and S3 key conventions.
//! No AWS SDK dependency — this is the shared vocabulary of the chatkeep system.

pub mod error;
pub mod models;
pub mod responder;
pub mod s3_keys;
