//! Handlers for the public gallery and like toggling.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use visionforge_core::error::CoreError;
use visionforge_core::types::DbId;
use visionforge_db::models::image::GalleryQuery;
use visionforge_db::repositories::{ImageRepo, LikeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/images
///
/// Public gallery listing: optional style filter, sort order, pagination.
pub async fn gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryQuery>,
) -> AppResult<impl IntoResponse> {
    let images = ImageRepo::gallery(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(images)))
}

/// Response payload for a like toggle.
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub image_id: DbId,
    /// Whether the image is liked by the caller after this call.
    pub liked: bool,
    pub like_count: i64,
}

/// POST /api/v1/images/{id}/like
///
/// Toggles the caller's like on an image.
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(image_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ImageRepo::find_by_id(&state.pool, image_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: image_id,
        }))?;

    let liked = LikeRepo::toggle(&state.pool, user.id, image_id).await?;
    let like_count = LikeRepo::count_for_image(&state.pool, image_id).await?;

    Ok(Json(ApiResponse::ok(LikeResponse {
        image_id,
        liked,
        like_count,
    })))
}
