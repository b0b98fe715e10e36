//! Cloudflare R2 storage backend.
//!
//! R2 speaks the S3 API against an account-scoped endpoint; public URLs
//! come from a separately configured public bucket domain.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;

use crate::{object_key, require_env, ObjectStore, StorageError, StoredObject};

const BACKEND_NAME: &str = "R2";
/// R2 ignores the region but the SDK requires one.
const R2_REGION: &str = "auto";

/// Cloudflare R2 backed [`ObjectStore`].
pub struct R2Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl R2Store {
    /// Build from `R2_ACCOUNT_ID`, `R2_BUCKET`, `R2_PUBLIC_URL`,
    /// `R2_ACCESS_KEY_ID`, and `R2_SECRET_ACCESS_KEY`.
    pub async fn from_env() -> Result<Self, StorageError> {
        let account_id = require_env("R2_ACCOUNT_ID")?;
        let bucket = require_env("R2_BUCKET")?;
        let public_url = require_env("R2_PUBLIC_URL")?;
        let access_key = require_env("R2_ACCESS_KEY_ID")?;
        let secret_key = require_env("R2_SECRET_ACCESS_KEY")?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "env");
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(R2_REGION))
            .endpoint_url(format!("https://{account_id}.r2.cloudflarestorage.com"))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok(Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for R2Store {
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
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                backend: BACKEND_NAME,
                message: e.to_string(),
            })?;

        let url = format!("{}/{key}", self.public_url);
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
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
