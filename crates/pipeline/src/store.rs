//! Persistence seam for the orchestrator.
//!
//! [`GenerationStore`] is the exact set of writes and reads the
//! orchestrator performs, no more. The production implementation
//! delegates to the repositories; tests substitute an in-memory fake.

use async_trait::async_trait;
use sqlx::PgPool;
use visionforge_core::types::{DbId, Timestamp};
use visionforge_db::models::image::NewImage;
use visionforge_db::models::job::NewJob;
use visionforge_db::repositories::{ImageRepo, JobRepo, PromptRepo, UserRepo};

/// Fields for a new job row. Mirrors the repository input but owns its
/// strings so fakes and queue payloads can hold it.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub prompt: String,
    pub params: serde_json::Value,
    pub num_images: i32,
}

/// Fields for a new image row, written only after a successful upload.
#[derive(Debug, Clone)]
pub struct ImageSpec {
    pub url: String,
    pub storage_key: String,
    pub width: i32,
    pub height: i32,
    pub style: String,
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub job_id: DbId,
}

/// A persisted image as returned to the caller of a generation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedImage {
    pub id: DbId,
    pub url: String,
    pub width: i32,
    pub height: i32,
    pub created_at: Timestamp,
}

/// Everything the orchestrator needs from the database.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Current credit balance, `None` when the user does not exist.
    async fn credits_of(&self, user_id: DbId) -> Result<Option<i32>, sqlx::Error>;

    /// Atomically debit `amount` if the balance covers it. `true` on
    /// success, `false` when the balance was too low.
    async fn try_debit_credits(&self, user_id: DbId, amount: i32) -> Result<bool, sqlx::Error>;

    /// Insert a prompt record, returning its ID.
    async fn create_prompt(&self, user_id: DbId, text: &str) -> Result<DbId, sqlx::Error>;

    /// Insert a Processing job row, returning its ID.
    async fn create_job(&self, spec: &JobSpec) -> Result<DbId, sqlx::Error>;

    /// Insert an image row for an uploaded artifact.
    async fn create_image(&self, spec: &ImageSpec) -> Result<GeneratedImage, sqlx::Error>;

    /// Mark a Processing job Completed.
    async fn complete_job(&self, job_id: DbId) -> Result<(), sqlx::Error>;

    /// Mark a Processing job Failed with an error message.
    async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), sqlx::Error>;

    /// Delete all image rows for a job (partial-failure rollback).
    async fn delete_job_images(&self, job_id: DbId) -> Result<u64, sqlx::Error>;
}

/// [`GenerationStore`] backed by Postgres via the repositories.
pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn credits_of(&self, user_id: DbId) -> Result<Option<i32>, sqlx::Error> {
        UserRepo::credits_of(&self.pool, user_id).await
    }

    async fn try_debit_credits(&self, user_id: DbId, amount: i32) -> Result<bool, sqlx::Error> {
        UserRepo::try_debit_credits(&self.pool, user_id, amount).await
    }

    async fn create_prompt(&self, user_id: DbId, text: &str) -> Result<DbId, sqlx::Error> {
        let prompt = PromptRepo::create(&self.pool, user_id, text).await?;
        Ok(prompt.id)
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<DbId, sqlx::Error> {
        let job = JobRepo::create(
            &self.pool,
            &NewJob {
                user_id: spec.user_id,
                prompt_id: spec.prompt_id,
                prompt: &spec.prompt,
                params: spec.params.clone(),
                num_images: spec.num_images,
            },
        )
        .await?;
        Ok(job.id)
    }

    async fn create_image(&self, spec: &ImageSpec) -> Result<GeneratedImage, sqlx::Error> {
        let image = ImageRepo::create(
            &self.pool,
            &NewImage {
                url: spec.url.clone(),
                storage_key: spec.storage_key.clone(),
                width: spec.width,
                height: spec.height,
                style: spec.style.clone(),
                user_id: spec.user_id,
                prompt_id: spec.prompt_id,
                job_id: spec.job_id,
            },
        )
        .await?;
        Ok(GeneratedImage {
            id: image.id,
            url: image.url,
            width: image.width,
            height: image.height,
            created_at: image.created_at,
        })
    }

    async fn complete_job(&self, job_id: DbId) -> Result<(), sqlx::Error> {
        JobRepo::complete(&self.pool, job_id).await
    }

    async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        JobRepo::fail(&self.pool, job_id, error).await
    }

    async fn delete_job_images(&self, job_id: DbId) -> Result<u64, sqlx::Error> {
        ImageRepo::delete_by_job(&self.pool, job_id).await
    }
}
