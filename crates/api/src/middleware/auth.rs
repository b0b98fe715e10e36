//! Identity extractors for Axum handlers.
//!
//! Identity arrives as an `X-User-Id` header set by the deployment's auth
//! proxy, which terminates the actual authentication protocol. The
//! extractor resolves it to a user row, so handlers always work with a
//! real, current user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use visionforge_core::error::CoreError;
use visionforge_core::types::DbId;
use visionforge_db::models::user::User;
use visionforge_db::repositories::UserRepo;

use crate::error::AppError;
use crate::state::AppState;

const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user loaded from the `X-User-Id` header.
///
/// Use as an extractor parameter in any handler that requires identity:
///
/// ```ignore
/// async fn my_handler(CurrentUser(user): CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id: DbId = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing or invalid X-User-Id header".into(),
                ))
            })?;

        let user = UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;

        Ok(CurrentUser(user))
    }
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
