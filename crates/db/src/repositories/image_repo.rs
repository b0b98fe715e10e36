//! Repository for the `images` table.

use sqlx::PgPool;
use visionforge_core::types::DbId;

use crate::models::image::{GalleryImage, GalleryQuery, GallerySort, Image, NewImage};

/// Column list for `images` queries.
const COLUMNS: &str =
    "id, url, storage_key, width, height, style, user_id, prompt_id, job_id, created_at";

/// Maximum gallery page size.
const MAX_PAGE_SIZE: i64 = 50;
/// Default gallery page size.
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Provides insert and listing for generated images.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert an image row. Called only after the artifact was uploaded.
    pub async fn create(pool: &PgPool, input: &NewImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images \
                 (url, storage_key, width, height, style, user_id, prompt_id, job_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(&input.url)
            .bind(&input.storage_key)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.style)
            .bind(input.user_id)
            .bind(input.prompt_id)
            .bind(input.job_id)
            .fetch_one(pool)
            .await
    }

    /// Find an image by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All images belonging to one job, oldest first (generation order).
    pub async fn list_by_job(pool: &PgPool, job_id: DbId) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE job_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }

    /// Delete all image rows for a job. Used by the orchestrator's
    /// partial-failure rollback.
    pub async fn delete_by_job(pool: &PgPool, job_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE job_id = $1")
            .bind(job_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total images generated by a user.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Gallery listing with optional style filter, sort, and pagination.
    pub async fn gallery(
        pool: &PgPool,
        params: &GalleryQuery,
    ) -> Result<Vec<GalleryImage>, sqlx::Error> {
        let page_size = params
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = params.page.unwrap_or(1).max(1);
        let offset = (page - 1) * page_size;

        let order = match params.sort {
            GallerySort::Latest => "i.created_at DESC",
            GallerySort::Oldest => "i.created_at ASC",
            GallerySort::Popular => "like_count DESC, i.created_at DESC",
        };

        let style_filter = if params.style.is_some() {
            "WHERE i.style = $3"
        } else {
            ""
        };

        let query = format!(
            "SELECT i.id, i.url, i.width, i.height, i.style, i.user_id, i.created_at, \
                    COUNT(l.id) AS like_count \
             FROM images i \
             LEFT JOIN likes l ON l.image_id = i.id \
             {style_filter} \
             GROUP BY i.id \
             ORDER BY {order} \
             LIMIT $1 OFFSET $2"
        );

        let mut q = sqlx::query_as::<_, GalleryImage>(&query)
            .bind(page_size)
            .bind(offset);
        if let Some(style) = &params.style {
            q = q.bind(style);
        }
        q.fetch_all(pool).await
    }
}
