//! Dashboard and admin analytics DTOs.

use serde::Serialize;
use sqlx::FromRow;

use super::image::Image;
use super::job::GenerationJob;

/// Per-user dashboard statistics.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_generations: i64,
    pub total_images: i64,
    pub credits_used: i64,
    pub credits_remaining: i32,
    pub recent_generations: Vec<JobWithImages>,
}

/// A job with its generated images attached.
#[derive(Debug, Serialize)]
pub struct JobWithImages {
    #[serde(flatten)]
    pub job: GenerationJob,
    pub images: Vec<Image>,
}

/// Site-wide analytics for the admin view.
#[derive(Debug, Serialize)]
pub struct AdminAnalytics {
    pub total_users: i64,
    pub total_generations: i64,
    pub total_images: i64,
    pub active_users_today: i64,
    pub requests_today: i64,
    pub errors_today: i64,
    pub credits_consumed_today: i64,
    pub daily_stats: Vec<DailyStat>,
}

/// One day of aggregated activity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyStat {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub generations: i64,
    pub users: i64,
    pub errors: i64,
}
