//! Aggregation queries for the admin analytics view.

use sqlx::PgPool;

use crate::models::stats::{AdminAnalytics, DailyStat};
use crate::models::status::JobStatus;

/// Days of history in the daily breakdown.
const DAILY_STAT_DAYS: i32 = 7;

/// Provides site-wide aggregate queries. Admin only.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Collect the full admin analytics snapshot.
    pub async fn snapshot(pool: &PgPool) -> Result<AdminAnalytics, sqlx::Error> {
        let total_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;
        let total_generations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM generation_jobs")
                .fetch_one(pool)
                .await?;
        let total_images = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
            .fetch_one(pool)
            .await?;

        let active_users_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM generation_jobs \
             WHERE created_at >= date_trunc('day', NOW())",
        )
        .fetch_one(pool)
        .await?;

        let requests_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM generation_jobs \
             WHERE created_at >= date_trunc('day', NOW())",
        )
        .fetch_one(pool)
        .await?;

        let errors_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM generation_jobs \
             WHERE created_at >= date_trunc('day', NOW()) AND status_id = $1",
        )
        .bind(JobStatus::Failed.id())
        .fetch_one(pool)
        .await?;

        let credits_consumed_today = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(credits_used), 0) FROM generation_jobs \
             WHERE created_at >= date_trunc('day', NOW()) AND status_id = $1",
        )
        .bind(JobStatus::Completed.id())
        .fetch_one(pool)
        .await?;

        let daily_stats = Self::daily_stats(pool).await?;

        Ok(AdminAnalytics {
            total_users,
            total_generations,
            total_images,
            active_users_today,
            requests_today,
            errors_today,
            credits_consumed_today,
            daily_stats,
        })
    }

    /// Per-day generation/user/error counts for the last week, oldest first.
    async fn daily_stats(pool: &PgPool) -> Result<Vec<DailyStat>, sqlx::Error> {
        sqlx::query_as::<_, DailyStat>(
            "SELECT to_char(date_trunc('day', created_at), 'YYYY-MM-DD') AS date, \
                    COUNT(*) AS generations, \
                    COUNT(DISTINCT user_id) AS users, \
                    COUNT(*) FILTER (WHERE status_id = $1) AS errors \
             FROM generation_jobs \
             WHERE created_at >= date_trunc('day', NOW()) - make_interval(days => $2) \
             GROUP BY 1 \
             ORDER BY 1 ASC",
        )
        .bind(JobStatus::Failed.id())
        .bind(DAILY_STAT_DAYS)
        .fetch_all(pool)
        .await
    }
}
