//! Pluggable object storage for generated images.
//!
//! Each backend implements [`ObjectStore`]: bytes in, a storage key plus a
//! publicly resolvable URL out, and an idempotent delete for later cleanup.
//! Which backend runs is a process-start decision made by [`build_store`].

pub mod memory;
pub mod r2;
pub mod s3;
pub mod supabase;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use r2::R2Store;
pub use s3::S3Store;
pub use supabase::SupabaseStore;

/// Key prefix for all generated artifacts.
const KEY_PREFIX: &str = "generations";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from an object storage backend. The orchestrator does not catch
/// these; an upload failure fails the job.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Missing credentials or malformed storage configuration. Raised at
    /// startup by [`build_store`], never mid-request.
    #[error("Storage not configured: {0}")]
    Configuration(String),

    /// The remote store rejected or failed the call.
    #[error("{backend} storage error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A stored object's addressing information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Opaque key needed to delete the object later.
    pub key: String,
    /// Publicly resolvable URL.
    pub url: String,
}

/// Uniform contract over object storage backends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Write `bytes` under a fresh collision-resistant key derived from
    /// `filename` and return its addressing information.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Delete an object. Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Build the storage key for a filename: timestamp-prefixed under the
/// generations prefix. The filename itself embeds the job ID and image
/// index, so same-millisecond uploads within a job cannot collide.
pub fn object_key(filename: &str) -> String {
    let unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{KEY_PREFIX}/{unix_ms}-{filename}")
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which storage backend to use. Decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    S3,
    R2,
    Supabase,
}

/// Storage selection, loaded from the environment.
///
/// Backend-specific credentials are read by each backend's `from_env`;
/// this only decides which one to build.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub kind: StorageKind,
}

impl StorageConfig {
    /// Load from `STORAGE_PROVIDER` (`s3` default, `r2`, `supabase`).
    pub fn from_env() -> Self {
        let kind = match std::env::var("STORAGE_PROVIDER").as_deref() {
            Ok("r2") => StorageKind::R2,
            Ok("supabase") => StorageKind::Supabase,
            _ => StorageKind::S3,
        };
        Self { kind }
    }
}

/// Resolve the configured backend into a trait object.
///
/// Fails fast on missing credentials instead of failing the first upload.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    Ok(match config.kind {
        StorageKind::S3 => Arc::new(S3Store::from_env().await?),
        StorageKind::R2 => Arc::new(R2Store::from_env().await?),
        StorageKind::Supabase => Arc::new(SupabaseStore::from_env()?),
    })
}

/// Read a required environment variable, mapping absence to a
/// configuration error naming the variable.
fn require_env(var: &str) -> Result<String, StorageError> {
    std::env::var(var).map_err(|_| StorageError::Configuration(format!("{var} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_is_prefixed_and_keeps_filename() {
        let key = object_key("42-0.png");
        assert!(key.starts_with("generations/"));
        assert!(key.ends_with("-42-0.png"));
    }

    #[test]
    fn object_keys_for_distinct_filenames_differ() {
        assert_ne!(object_key("1-0.png"), object_key("1-1.png"));
    }
}
