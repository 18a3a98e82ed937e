//! Whole-document persistence of conversation transcripts.
//!
//! Each conversation is one JSON array at `{conversation_id}.json`. Reads and
//! writes always move the full document; a write is a single PUT, so readers
//! see either the previous transcript or the new one.
//!
//! Concurrent writers are detected with ETag preconditions: [`fetch`] returns
//! the [`Revision`] it read, and [`save_if_unchanged`] only succeeds if the
//! object is still at that revision.
//!
//! [`fetch`]: ConversationStore::fetch
//! [`save_if_unchanged`]: ConversationStore::save_if_unchanged

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chatkeep_core::models::{ConversationId, MessageHistory};
use chatkeep_core::s3_keys;
use tracing::{debug, info};

use crate::error::{ConversationStoreError, StorageError};
use crate::store::{ObjectStore, PutCondition};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a [`Snapshot`] was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// No object existed.
    Absent,
    /// The object's ETag.
    Tagged(String),
    /// The object existed but the store returned no ETag.
    Untagged,
}

impl Revision {
    fn put_condition(&self) -> PutCondition {
        match self {
            Revision::Absent => PutCondition::IfNoneMatch,
            Revision::Tagged(etag) => PutCondition::IfMatch(etag.clone()),
            Revision::Untagged => PutCondition::None,
        }
    }
}

/// A transcript together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub history: MessageHistory,
    pub revision: Revision,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            history: MessageHistory::new(),
            revision: Revision::Absent,
        }
    }
}

pub struct ConversationStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    timeout: Duration,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound every object-store call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Read the transcript and its revision. A missing object is an empty
    /// transcript at [`Revision::Absent`].
    pub async fn fetch(&self, id: &ConversationId) -> Result<Snapshot, ConversationStoreError> {
        let key = s3_keys::conversation(id);

        let output = match self
            .bounded("GetObject", self.store.get_object(&self.bucket, &key))
            .await
        {
            Ok(output) => output,
            Err(StorageError::NotFound { .. }) => {
                debug!(conversation_id = %id, key = %key, "no stored conversation");
                return Ok(Snapshot::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let history = MessageHistory::from_json(&output.body)
            .map_err(|source| ConversationStoreError::Corrupt {
                key: key.clone(),
                source,
            })?;

        let revision = match output.etag {
            Some(etag) if !etag.is_empty() => Revision::Tagged(etag),
            _ => Revision::Untagged,
        };

        debug!(conversation_id = %id, key = %key, messages = history.len(), ?revision, "conversation loaded");
        Ok(Snapshot { history, revision })
    }

    /// Read the transcript. A missing object is an empty transcript.
    pub async fn load(&self, id: &ConversationId) -> Result<MessageHistory, ConversationStoreError> {
        Ok(self.fetch(id).await?.history)
    }

    /// Overwrite the stored transcript. Returns the new ETag.
    pub async fn save(
        &self,
        id: &ConversationId,
        history: &MessageHistory,
    ) -> Result<String, ConversationStoreError> {
        self.put(id, history, PutCondition::None).await
    }

    /// Write the transcript only if the stored object is still at `expected`.
    /// Returns the new ETag, or [`ConversationStoreError::Conflict`] if another
    /// writer got there first.
    pub async fn save_if_unchanged(
        &self,
        id: &ConversationId,
        history: &MessageHistory,
        expected: &Revision,
    ) -> Result<String, ConversationStoreError> {
        self.put(id, history, expected.put_condition()).await
    }

    async fn put(
        &self,
        id: &ConversationId,
        history: &MessageHistory,
        condition: PutCondition,
    ) -> Result<String, ConversationStoreError> {
        let key = s3_keys::conversation(id);
        let body = history
            .to_json()
            .map_err(ConversationStoreError::Serialization)?;

        let etag = self
            .bounded(
                "PutObject",
                self.store.put_object(
                    &self.bucket,
                    &key,
                    body,
                    s3_keys::CONTENT_TYPE_JSON,
                    condition,
                ),
            )
            .await
            .map_err(|e| match e {
                StorageError::PreconditionFailed { key } => ConversationStoreError::Conflict { key },
                other => ConversationStoreError::Unavailable(other),
            })?;

        info!(conversation_id = %id, key = %key, etag = %etag, messages = history.len(), "conversation saved");
        Ok(etag)
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                op,
                after: self.timeout,
            }),
        }
    }
}
