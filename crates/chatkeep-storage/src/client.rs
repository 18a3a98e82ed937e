use std::time::Duration;

use aws_sdk_s3::Client;
use aws_smithy_types::timeout::TimeoutConfig;

/// S3 client settings layered over the shared `SdkConfig`.
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    /// Custom endpoint, e.g. `http://localhost:9000` for MinIO. Switches the
    /// client to path-style addressing.
    pub endpoint_url: Option<String>,
    /// Upper bound on a whole S3 operation, retries included.
    pub operation_timeout: Option<Duration>,
}

/// Build an S3 client from an `SdkConfig` plus endpoint/timeout overrides.
pub fn build_client(sdk_config: &aws_config::SdkConfig, settings: &S3Settings) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

    if let Some(url) = &settings.endpoint_url {
        builder = builder.endpoint_url(url).force_path_style(true);
    }

    if let Some(timeout) = settings.operation_timeout {
        builder = builder.timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(timeout)
                .build(),
        );
    }

    Client::from_conf(builder.build())
}
