use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("precondition failed for key: {key}")]
    PreconditionFailed { key: String },

    #[error("S3 GetObject error: {0}")]
    GetObject(String),

    #[error("S3 PutObject error: {0}")]
    PutObject(String),

    #[error("S3 HeadBucket error: {0}")]
    HeadBucket(String),

    #[error("S3 CreateBucket error: {0}")]
    CreateBucket(String),

    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },
}

/// Errors from [`ConversationStore`](crate::conversation::ConversationStore).
///
/// A missing object is not an error: it loads as an empty history.
#[derive(Debug, Error)]
pub enum ConversationStoreError {
    #[error("conversation document {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("conversation document {key} was modified concurrently")]
    Conflict { key: String },

    #[error("object store unavailable: {0}")]
    Unavailable(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}
