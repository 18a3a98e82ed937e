use std::sync::Arc;

use chatkeep_storage::client::{S3Settings, build_client};
use chatkeep_storage::memory::MemoryObjectStore;
use chatkeep_storage::store::{ObjectStore, S3ObjectStore};

use crate::config::{AppConfig, CredentialSource, StoreBackend};

/// Build an `SdkConfig` from a region and credential source.
pub async fn build_aws_config(region: &str, creds: &CredentialSource) -> aws_config::SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    match creds {
        CredentialSource::Inline {
            access_key_id,
            secret_access_key,
        } => {
            builder = builder.credentials_provider(aws_sdk_s3::config::Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "chatkeep-config",
            ));
        }
        CredentialSource::Profile { profile_name } => {
            builder = builder.profile_name(profile_name);
        }
        CredentialSource::DefaultChain => {}
    }

    builder.load().await
}

/// Build the object store selected by the config.
pub async fn build_object_store(config: &AppConfig) -> Arc<dyn ObjectStore> {
    match config.store {
        StoreBackend::Memory => Arc::new(MemoryObjectStore::new()),
        StoreBackend::S3 => {
            let sdk_config = build_aws_config(&config.region, &config.storage_credentials).await;
            let settings = S3Settings {
                endpoint_url: config.endpoint_url.clone(),
                operation_timeout: Some(config.store_timeout),
            };
            Arc::new(S3ObjectStore::new(build_client(&sdk_config, &settings)))
        }
    }
}
