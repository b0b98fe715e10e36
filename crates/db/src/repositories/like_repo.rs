//! Repository for the `likes` table.

use sqlx::PgPool;
use visionforge_core::types::DbId;

/// Provides the like toggle.
pub struct LikeRepo;

impl LikeRepo {
    /// Toggle a like: delete the (user, image) row if it exists, insert it
    /// otherwise. Returns `true` when the image is liked after the call.
    ///
    /// The insert ignores a unique-constraint conflict, so two concurrent
    /// toggles cannot produce a duplicate pair.
    pub async fn toggle(pool: &PgPool, user_id: DbId, image_id: DbId) -> Result<bool, sqlx::Error> {
        let deleted = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND image_id = $2")
            .bind(user_id)
            .bind(image_id)
            .execute(pool)
            .await?;

        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO likes (user_id, image_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_likes_user_image DO NOTHING",
        )
        .bind(user_id)
        .bind(image_id)
        .execute(pool)
        .await?;
        Ok(true)
    }

    /// Number of likes on an image.
    pub async fn count_for_image(pool: &PgPool, image_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE image_id = $1")
            .bind(image_id)
            .fetch_one(pool)
            .await
    }
}
