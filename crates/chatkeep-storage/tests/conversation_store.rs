use std::sync::Arc;
use std::time::Duration;

use chatkeep_core::models::{ConversationId, Message, MessageHistory};
use chatkeep_storage::bucket::ensure_bucket;
use chatkeep_storage::conversation::{ConversationStore, Revision};
use chatkeep_storage::error::{ConversationStoreError, StorageError};
use chatkeep_storage::memory::MemoryObjectStore;
use chatkeep_storage::store::{BoxFuture, GetObjectOutput, ObjectStore, PutCondition};

const BUCKET: &str = "conversations";

fn id(s: &str) -> ConversationId {
    ConversationId::new(s).unwrap()
}

fn one_turn() -> MessageHistory {
    MessageHistory::from(vec![
        Message::human("hello"),
        Message::assistant("hi there"),
    ])
}

fn memory_store() -> (Arc<MemoryObjectStore>, ConversationStore) {
    let objects = Arc::new(MemoryObjectStore::with_bucket(BUCKET));
    let store = ConversationStore::new(objects.clone(), BUCKET);
    (objects, store)
}

/// Store whose every call fails as if the backend were unreachable.
struct DownStore;

impl ObjectStore for DownStore {
    fn bucket_exists<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async { Err(StorageError::HeadBucket("connection refused".to_string())) })
    }

    fn create_bucket<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async { Err(StorageError::CreateBucket("connection refused".to_string())) })
    }

    fn get_object<'a>(
        &'a self,
        _: &'a str,
        _: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>> {
        Box::pin(async { Err(StorageError::GetObject("connection refused".to_string())) })
    }

    fn put_object<'a>(
        &'a self,
        _: &'a str,
        _: &'a str,
        _: Vec<u8>,
        _: &'a str,
        _: PutCondition,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async { Err(StorageError::PutObject("connection refused".to_string())) })
    }
}

/// Store whose reads never complete.
struct HangingStore;

impl ObjectStore for HangingStore {
    fn bucket_exists<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(std::future::pending())
    }

    fn create_bucket<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(std::future::pending())
    }

    fn get_object<'a>(
        &'a self,
        _: &'a str,
        _: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>> {
        Box::pin(std::future::pending())
    }

    fn put_object<'a>(
        &'a self,
        _: &'a str,
        _: &'a str,
        _: Vec<u8>,
        _: &'a str,
        _: PutCondition,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(std::future::pending())
    }
}

#[tokio::test]
async fn missing_conversation_loads_empty() {
    let (_, store) = memory_store();

    let history = store.load(&id("never-seen")).await.unwrap();
    assert!(history.is_empty());

    let snapshot = store.fetch(&id("never-seen")).await.unwrap();
    assert_eq!(snapshot.revision, Revision::Absent);
}

#[tokio::test]
async fn save_then_load_returns_same_history() {
    let (_, store) = memory_store();
    let mut history = one_turn();
    history.push(Message::human("how are you?"));
    history.push(Message::assistant("fine, thanks"));

    store.save(&id("s1"), &history).await.unwrap();

    assert_eq!(store.load(&id("s1")).await.unwrap(), history);
}

#[tokio::test]
async fn saved_document_is_json_array_at_conversation_key() {
    let (objects, store) = memory_store();
    store.save(&id("s1"), &one_turn()).await.unwrap();

    let output = objects.get_object(BUCKET, "s1.json").await.unwrap();
    assert_eq!(output.content_type.as_deref(), Some("application/json"));

    let value: serde_json::Value = serde_json::from_slice(&output.body).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"role": "human", "content": "hello"},
            {"role": "ai", "content": "hi there"},
        ])
    );
}

#[tokio::test]
async fn resaving_same_history_writes_identical_bytes() {
    let (objects, store) = memory_store();
    let history = one_turn();

    store.save(&id("s1"), &history).await.unwrap();
    let first = objects.get_object(BUCKET, "s1.json").await.unwrap().body;

    store.save(&id("s1"), &history).await.unwrap();
    let second = objects.get_object(BUCKET, "s1.json").await.unwrap().body;

    assert_eq!(first, second);
}

#[tokio::test]
async fn conversations_are_independent() {
    let (_, store) = memory_store();
    store.save(&id("a"), &one_turn()).await.unwrap();

    assert!(store.load(&id("b")).await.unwrap().is_empty());
    assert_eq!(store.load(&id("a")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_document_is_corrupt_not_empty() {
    let (objects, store) = memory_store();
    objects
        .put_object(
            BUCKET,
            "s1.json",
            b"{not json".to_vec(),
            "application/json",
            PutCondition::None,
        )
        .await
        .unwrap();

    let err = store.load(&id("s1")).await.unwrap_err();
    assert!(
        matches!(err, ConversationStoreError::Corrupt { ref key, .. } if key == "s1.json"),
        "expected Corrupt, got {err:?}"
    );
}

#[tokio::test]
async fn backend_failure_on_load_is_unavailable() {
    let store = ConversationStore::new(Arc::new(DownStore), BUCKET);

    let err = store.load(&id("s1")).await.unwrap_err();
    assert!(matches!(
        err,
        ConversationStoreError::Unavailable(StorageError::GetObject(_))
    ));
}

#[tokio::test]
async fn backend_failure_on_save_is_reported() {
    let store = ConversationStore::new(Arc::new(DownStore), BUCKET);

    let err = store.save(&id("s1"), &one_turn()).await.unwrap_err();
    assert!(matches!(
        err,
        ConversationStoreError::Unavailable(StorageError::PutObject(_))
    ));
}

#[tokio::test]
async fn stuck_store_call_times_out() {
    let store =
        ConversationStore::new(Arc::new(HangingStore), BUCKET).with_timeout(Duration::from_millis(50));

    let err = store.load(&id("s1")).await.unwrap_err();
    assert!(matches!(
        err,
        ConversationStoreError::Unavailable(StorageError::Timeout { op: "GetObject", .. })
    ));
}

#[tokio::test]
async fn conditional_save_rejects_stale_revision() {
    let (_, store) = memory_store();
    let conversation = id("s1");
    store.save(&conversation, &one_turn()).await.unwrap();

    let stale = store.fetch(&conversation).await.unwrap();

    // Another writer lands first.
    let mut theirs = stale.history.clone();
    theirs.push(Message::human("theirs"));
    theirs.push(Message::assistant("reply to theirs"));
    store
        .save_if_unchanged(&conversation, &theirs, &stale.revision)
        .await
        .unwrap();

    let mut ours = stale.history.clone();
    ours.push(Message::human("ours"));
    ours.push(Message::assistant("reply to ours"));
    let err = store
        .save_if_unchanged(&conversation, &ours, &stale.revision)
        .await
        .unwrap_err();

    assert!(matches!(err, ConversationStoreError::Conflict { .. }));
    assert_eq!(store.load(&conversation).await.unwrap(), theirs);
}

#[tokio::test]
async fn conditional_create_fails_when_object_exists() {
    let (_, store) = memory_store();
    let conversation = id("s1");
    store.save(&conversation, &one_turn()).await.unwrap();

    let err = store
        .save_if_unchanged(&conversation, &MessageHistory::new(), &Revision::Absent)
        .await
        .unwrap_err();

    assert!(matches!(err, ConversationStoreError::Conflict { .. }));
    assert_eq!(store.load(&conversation).await.unwrap(), one_turn());
}

/// Memory store that, like some S3-compatible services, returns no ETag on GET.
struct UntaggedStore(MemoryObjectStore);

impl ObjectStore for UntaggedStore {
    fn bucket_exists<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        self.0.bucket_exists(bucket)
    }

    fn create_bucket<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        self.0.create_bucket(bucket)
    }

    fn get_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>> {
        Box::pin(async move {
            let mut output = self.0.get_object(bucket, key).await?;
            output.etag = None;
            Ok(output)
        })
    }

    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
        condition: PutCondition,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        self.0.put_object(bucket, key, body, content_type, condition)
    }
}

#[tokio::test]
async fn object_without_etag_is_untagged_and_overwritten_unconditionally() {
    let store = ConversationStore::new(
        Arc::new(UntaggedStore(MemoryObjectStore::with_bucket(BUCKET))),
        BUCKET,
    );
    let conversation = id("s1");
    store.save(&conversation, &one_turn()).await.unwrap();

    let snapshot = store.fetch(&conversation).await.unwrap();
    assert_eq!(snapshot.revision, Revision::Untagged);
    assert_eq!(snapshot.history, one_turn());

    let mut next = snapshot.history.clone();
    next.push(Message::human("again"));
    next.push(Message::assistant("hello again"));
    store
        .save_if_unchanged(&conversation, &next, &snapshot.revision)
        .await
        .unwrap();

    let stored = store.load(&conversation).await.unwrap();
    assert_eq!(stored.messages().len(), 4);
    assert_eq!(stored, next);
}

#[tokio::test]
async fn ensure_bucket_creates_missing_bucket_once() {
    let objects = MemoryObjectStore::new();
    assert!(!objects.bucket_exists(BUCKET).await.unwrap());

    ensure_bucket(&objects, BUCKET).await.unwrap();
    assert!(objects.bucket_exists(BUCKET).await.unwrap());

    // Second call is a no-op.
    ensure_bucket(&objects, BUCKET).await.unwrap();
    assert!(objects.bucket_exists(BUCKET).await.unwrap());
}

#[tokio::test]
async fn ensure_bucket_surfaces_backend_failure() {
    let err = ensure_bucket(&DownStore, BUCKET).await.unwrap_err();
    assert!(matches!(err, StorageError::HeadBucket(_)));
}
