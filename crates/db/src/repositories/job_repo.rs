//! Repository for the `generation_jobs` table.
//!
//! A job is inserted as Processing and receives exactly one terminal
//! write: either `complete` or `fail`. Both guard on the Processing
//! status so a terminal state can never be overwritten.

use sqlx::PgPool;
use visionforge_core::types::DbId;

use crate::models::job::{GenerationJob, NewJob};
use crate::models::status::JobStatus;

/// Column list for `generation_jobs` queries.
const COLUMNS: &str = "\
    id, user_id, prompt_id, prompt, params, num_images, status_id, \
    error, credits_used, started_at, completed_at, created_at";

/// Maximum recent jobs returned for the dashboard.
const RECENT_LIMIT: i64 = 10;

/// Provides lifecycle operations for generation jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new Processing job with `started_at = NOW()`.
    ///
    /// `credits_used` records the debit that will apply on completion
    /// (one credit per requested image).
    pub async fn create(pool: &PgPool, input: &NewJob<'_>) -> Result<GenerationJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_jobs \
                 (user_id, prompt_id, prompt, params, num_images, status_id, credits_used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(input.user_id)
            .bind(input.prompt_id)
            .bind(input.prompt)
            .bind(&input.params)
            .bind(input.num_images)
            .bind(JobStatus::Processing.id())
            .bind(input.num_images)
            .fetch_one(pool)
            .await
    }

    /// Mark a Processing job Completed.
    pub async fn complete(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, completed_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a Processing job Failed with the adapter's error message.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, error = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<GenerationJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_jobs WHERE id = $1");
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's most recent jobs, newest first.
    pub async fn recent_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<GenerationJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_jobs \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(user_id)
            .bind(RECENT_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Total jobs submitted by a user.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM generation_jobs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Sum of credits consumed by the user's Completed jobs.
    pub async fn credits_used_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(credits_used), 0) FROM generation_jobs \
             WHERE user_id = $1 AND status_id = $2",
        )
        .bind(user_id)
        .bind(JobStatus::Completed.id())
        .fetch_one(pool)
        .await
    }
}
