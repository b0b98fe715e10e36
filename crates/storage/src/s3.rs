//! AWS S3 storage backend.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;

use crate::{object_key, require_env, ObjectStore, StorageError, StoredObject};

const BACKEND_NAME: &str = "S3";
const DEFAULT_REGION: &str = "us-east-1";
/// Generated artifacts are content-addressed by key and never rewritten.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// S3 backed [`ObjectStore`].
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3Store {
    /// Build from `AWS_S3_BUCKET`, `AWS_REGION` (default `us-east-1`),
    /// `AWS_ACCESS_KEY_ID`, and `AWS_SECRET_ACCESS_KEY`.
    pub async fn from_env() -> Result<Self, StorageError> {
        let bucket = require_env("AWS_S3_BUCKET")?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        let access_key = require_env("AWS_ACCESS_KEY_ID")?;
        let secret_key = require_env("AWS_SECRET_ACCESS_KEY")?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "env");
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok(Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            region,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = object_key(filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                backend: BACKEND_NAME,
                message: e.to_string(),
            })?;

        let url = format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.bucket, self.region
        );
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // S3 DeleteObject succeeds for absent keys, so this is idempotent
        // without a preceding existence check.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                backend: BACKEND_NAME,
                message: e.to_string(),
            })?;
        Ok(())
    }
}
