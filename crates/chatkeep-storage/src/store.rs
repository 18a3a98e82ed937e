use std::future::Future;
use std::pin::Pin;

use aws_sdk_s3::Client;

use crate::error::StorageError;
use crate::objects;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a GET operation, including the body and ETag.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
}

/// Precondition attached to a PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Unconditional overwrite.
    None,
    /// Only write if the current object's ETag matches.
    IfMatch(String),
    /// Only write if no object exists at the key.
    IfNoneMatch,
}

/// An S3-compatible blob service addressed by bucket + key.
///
/// `get_object` reports a missing key as `StorageError::NotFound`, and
/// `put_object` reports a failed precondition as
/// `StorageError::PreconditionFailed`. Every PUT replaces the whole object.
pub trait ObjectStore: Send + Sync {
    fn bucket_exists<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn create_bucket<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    fn get_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>>;

    /// Returns the new ETag.
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
        condition: PutCondition,
    ) -> BoxFuture<'a, Result<String, StorageError>>;
}

/// [`ObjectStore`] backed by AWS S3 or any S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: Option<String>,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        let region = client.config().region().map(|r| r.to_string());
        Self { client, region }
    }
}

impl ObjectStore for S3ObjectStore {
    fn bucket_exists<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(objects::bucket_exists(&self.client, bucket))
    }

    fn create_bucket<'a>(&'a self, bucket: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(objects::create_bucket(
            &self.client,
            bucket,
            self.region.as_deref(),
        ))
    }

    fn get_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<GetObjectOutput, StorageError>> {
        Box::pin(objects::get_object(&self.client, bucket, key))
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
            objects::put_object(
                &self.client,
                bucket,
                key,
                body,
                Some(content_type),
                &condition,
            )
            .await
        })
    }
}
