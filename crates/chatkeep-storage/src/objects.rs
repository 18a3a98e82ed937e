use aws_sdk_s3::Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;
use crate::store::{GetObjectOutput, PutCondition};

/// S3 error codes that mean a conditional write lost the race.
const PRECONDITION_CODES: &[&str] = &["PreconditionFailed", "ConditionalRequestConflict"];

/// Check whether a bucket exists and is reachable with the current credentials.
pub async fn bucket_exists(client: &Client, bucket: &str) -> Result<bool, StorageError> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(e) => {
            let err = e.into_service_error();
            if err.is_not_found() {
                Ok(false)
            } else {
                Err(StorageError::HeadBucket(err.to_string()))
            }
        }
    }
}

/// Create a bucket. Outside `us-east-1` the region is sent as the location
/// constraint. A bucket we already own counts as success.
pub async fn create_bucket(
    client: &Client,
    bucket: &str,
    region: Option<&str>,
) -> Result<(), StorageError> {
    let mut req = client.create_bucket().bucket(bucket);

    if let Some(region) = region.filter(|r| *r != "us-east-1") {
        req = req.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        );
    }

    match req.send().await {
        Ok(_) => Ok(()),
        Err(e) => {
            let err = e.into_service_error();
            if err.is_bucket_already_owned_by_you() {
                Ok(())
            } else {
                Err(StorageError::CreateBucket(err.to_string()))
            }
        }
    }
}

/// Fetch a whole object. A missing key is `StorageError::NotFound`.
pub async fn get_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<GetObjectOutput, StorageError> {
    let output = match client.get_object().bucket(bucket).key(key).send().await {
        Ok(output) => output,
        Err(e) => {
            let err = e.into_service_error();
            return Err(if err.is_no_such_key() {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::GetObject(err.to_string())
            });
        }
    };

    let body = output
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(format!("reading body of {key}: {e}")))?;

    Ok(GetObjectOutput {
        body: body.to_vec(),
        etag: output.e_tag,
        content_type: output.content_type,
    })
}

/// Put an object to S3 as a single request. Returns the new ETag.
///
/// `PutCondition::IfMatch` sends `If-Match` (ETag optimistic locking);
/// `PutCondition::IfNoneMatch` sends `If-None-Match: *` so the write only
/// succeeds when no object exists yet. A lost race surfaces as
/// `StorageError::PreconditionFailed`.
pub async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
    condition: &PutCondition,
) -> Result<String, StorageError> {
    let mut req = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body));

    if let Some(ct) = content_type {
        req = req.content_type(ct);
    }

    req = match condition {
        PutCondition::None => req,
        PutCondition::IfMatch(etag) => req.if_match(etag),
        PutCondition::IfNoneMatch => req.if_none_match("*"),
    };

    let resp = req.send().await.map_err(|e| {
        let err = e.into_service_error();
        if err.code().is_some_and(|c| PRECONDITION_CODES.contains(&c)) {
            StorageError::PreconditionFailed {
                key: key.to_string(),
            }
        } else {
            StorageError::PutObject(err.to_string())
        }
    })?;

    Ok(resp.e_tag().unwrap_or_default().to_string())
}
