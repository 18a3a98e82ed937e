use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::store::{BoxFuture, GetObjectOutput, ObjectStore, PutCondition};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    etag: String,
    content_type: String,
}

#[derive(Debug, Default)]
struct Buckets {
    objects: HashMap<String, HashMap<String, StoredObject>>,
    next_etag: u64,
}

/// In-process [`ObjectStore`] with the same conditional-write semantics as S3.
///
/// Used for local runs without a bucket and in tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Buckets>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with `bucket` already created.
    pub fn with_bucket(bucket: &str) -> Self {
        let mut buckets = Buckets::default();
        buckets.objects.insert(bucket.to_string(), HashMap::new());
        Self {
            inner: Mutex::new(buckets),
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn bucket_exists<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { Ok(self.inner.lock().await.objects.contains_key(bucket)) })
    }

    fn create_bucket<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.inner
                .lock()
                .await
                .objects
                .entry(bucket.to_string())
                .or_default();
            Ok(())
        })
    }

    fn get_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>> {
        Box::pin(async move {
            let buckets = self.inner.lock().await;
            let objects = buckets
                .objects
                .get(bucket)
                .ok_or_else(|| StorageError::GetObject(format!("no such bucket: {bucket}")))?;
            let object = objects.get(key).ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })?;
            Ok(GetObjectOutput {
                body: object.body.clone(),
                etag: Some(object.etag.clone()),
                content_type: Some(object.content_type.clone()),
            })
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
        Box::pin(async move {
            let mut buckets = self.inner.lock().await;
            buckets.next_etag += 1;
            let etag = format!("\"{}\"", buckets.next_etag);

            let objects = buckets
                .objects
                .get_mut(bucket)
                .ok_or_else(|| StorageError::PutObject(format!("no such bucket: {bucket}")))?;

            let current = objects.get(key).map(|o| o.etag.as_str());
            let allowed = match &condition {
                PutCondition::None => true,
                PutCondition::IfMatch(expected) => current == Some(expected.as_str()),
                PutCondition::IfNoneMatch => current.is_none(),
            };
            if !allowed {
                return Err(StorageError::PreconditionFailed {
                    key: key.to_string(),
                });
            }

            objects.insert(
                key.to_string(),
                StoredObject {
                    body,
                    etag: etag.clone(),
                    content_type: content_type.to_string(),
                },
            );
            Ok(etag)
        })
    }
}
