//! S3 result sink.

use crate::error::BlockCheckError;
use crate::sink::{encode_jsonl, ResultSink};
use crate::types::CheckResult;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

/// Sink that uploads the JSONL-encoded result batch to one S3 object.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
}

impl S3Sink {
    /// Create a sink using the default AWS credential chain
    /// (environment, profile, instance role).
    pub async fn new<B: Into<String>, K: Into<String>>(bucket: B, key: K) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create a sink with static credentials and an optional custom
    /// endpoint (S3-compatible stores, local test servers).
    pub fn with_static_credentials(
        region: String,
        bucket: String,
        key: String,
        access_key: String,
        secret_key: String,
        endpoint: Option<String>,
    ) -> Self {
        let credentials =
            aws_sdk_s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region))
            .credentials_provider(credentials);

        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
            key,
        }
    }

    fn object_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

#[async_trait]
impl ResultSink for S3Sink {
    async fn persist(&self, records: &[CheckResult]) -> crate::Result<()> {
        let body = encode_jsonl(records)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("application/x-ndjson")
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| BlockCheckError::storage(self.object_uri(), e.to_string()))?;

        Ok(())
    }
}
