//! chatkeep-storage
//!
//! Object storage for conversation transcripts. Thin wrapper around the AWS
//! S3 SDK (works against MinIO), an in-memory backend, and the conversation
//! store built on top of either.

pub mod bucket;
pub mod client;
pub mod conversation;
pub mod error;
pub mod memory;
pub mod objects;
pub mod store;
