use tracing::info;

use crate::error::StorageError;
use crate::store::ObjectStore;

/// Create `bucket` if it does not exist yet. Run once at startup.
pub async fn ensure_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<(), StorageError> {
    if store.bucket_exists(bucket).await? {
        info!(bucket, "bucket exists");
        return Ok(());
    }

    store.create_bucket(bucket).await?;
    info!(bucket, "bucket created");
    Ok(())
}
