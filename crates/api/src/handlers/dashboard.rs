//! Handler for `GET /api/v1/dashboard/stats`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use visionforge_db::models::stats::{DashboardStats, JobWithImages};
use visionforge_db::repositories::{ImageRepo, JobRepo};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
///
/// Per-user overview: lifetime totals, credit usage, and the most recent
/// jobs with their images attached.
pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let total_generations = JobRepo::count_by_user(&state.pool, user.id).await?;
    let total_images = ImageRepo::count_by_user(&state.pool, user.id).await?;
    let credits_used = JobRepo::credits_used_by_user(&state.pool, user.id).await?;

    let jobs = JobRepo::recent_by_user(&state.pool, user.id).await?;
    let mut recent_generations = Vec::with_capacity(jobs.len());
    for job in jobs {
        let images = ImageRepo::list_by_job(&state.pool, job.id).await?;
        recent_generations.push(JobWithImages { job, images });
    }

    Ok(Json(ApiResponse::ok(DashboardStats {
        total_generations,
        total_images,
        credits_used,
        credits_remaining: user.credits,
        recent_generations,
    })))
}
