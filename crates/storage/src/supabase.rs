//! Supabase Storage backend, via its REST object API.

use crate::{object_key, require_env, ObjectStore, StorageError, StoredObject};

const BACKEND_NAME: &str = "Supabase";
const BUCKET: &str = "visionforge-images";

/// Supabase Storage backed [`ObjectStore`].
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStore {
    /// Build from `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> Result<Self, StorageError> {
        let base_url = require_env("SUPABASE_URL")?;
        let service_key = require_env("SUPABASE_SERVICE_ROLE_KEY")?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    /// Map a non-2xx REST response to a backend error.
    fn ensure_success(op: &'static str, status: reqwest::StatusCode) -> Result<(), StorageError> {
        if status.is_success() {
            return Ok(());
        }
        Err(StorageError::Backend {
            backend: BACKEND_NAME,
            message: format!("{op} failed: {status}"),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for SupabaseStore {
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
        let endpoint = format!("{}/storage/v1/object/{BUCKET}/{key}", self.base_url);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                backend: BACKEND_NAME,
                message: e.to_string(),
            })?;

        Self::ensure_success("upload", response.status())?;

        let url = format!("{}/storage/v1/object/public/{BUCKET}/{key}", self.base_url);
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // The bulk-delete endpoint reports 200 for unknown prefixes, which
        // gives the idempotency the contract requires; an auth or server
        // failure still comes back non-2xx and must surface.
        let endpoint = format!("{}/storage/v1/object/{BUCKET}", self.base_url);
        let body = serde_json::json!({ "prefixes": [key] });

        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(&self.service_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                backend: BACKEND_NAME,
                message: e.to_string(),
            })?;

        Self::ensure_success("delete", response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn success_statuses_pass_through() {
        assert!(SupabaseStore::ensure_success("delete", StatusCode::OK).is_ok());
        assert!(SupabaseStore::ensure_success("upload", StatusCode::CREATED).is_ok());
    }

    #[test]
    fn delete_surfaces_auth_and_server_failures() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::INTERNAL_SERVER_ERROR] {
            let err = SupabaseStore::ensure_success("delete", status).unwrap_err();
            match err {
                StorageError::Backend { backend, message } => {
                    assert_eq!(backend, "Supabase");
                    assert!(message.starts_with("delete failed:"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
