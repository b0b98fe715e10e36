//! Admin-only handlers: site analytics and user management.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use visionforge_core::error::CoreError;
use visionforge_core::types::DbId;
use visionforge_db::models::status::{UserRole, UserTier};
use visionforge_db::models::user::{UpdateUser, UserResponse};
use visionforge_db::repositories::{AnalyticsRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let snapshot = AnalyticsRepo::snapshot(&state.pool).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let users: Vec<UserResponse> = UserRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// PATCH /api/v1/admin/users/{id}
///
/// Updates role, tier, and/or credit balance. Unknown role/tier names and
/// negative balances are rejected up front rather than silently ignored.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    if let Some(role) = input.role.as_deref() {
        if UserRole::from_name(role).is_none() {
            return Err(AppError::BadRequest(format!("Unknown role: {role}")));
        }
    }
    if let Some(tier) = input.tier.as_deref() {
        if UserTier::from_name(tier).is_none() {
            return Err(AppError::BadRequest(format!("Unknown tier: {tier}")));
        }
    }
    if let Some(credits) = input.credits {
        if credits < 0 {
            return Err(AppError::BadRequest(
                "credits must be non-negative".to_string(),
            ));
        }
    }

    let updated = UserRepo::update(&state.pool, user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    Ok(Json(ApiResponse::ok_with_message(
        UserResponse::from(updated),
        "User updated",
    )))
}
