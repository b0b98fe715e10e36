//! Handler for `POST /api/v1/prompt/enhance`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use visionforge_core::style::StylePreset;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for prompt enhancement.
#[derive(Debug, Deserialize, Validate)]
pub struct EnhanceRequest {
    #[validate(length(min = 3, max = 2000, message = "prompt must be 3 to 2000 characters"))]
    pub prompt: String,
    pub style: Option<StylePreset>,
}

/// POST /api/v1/prompt/enhance
///
/// Never fails on enhancement itself: a backend problem degrades to the
/// rule-based result inside the enhancer.
pub async fn enhance_prompt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<EnhanceRequest>,
) -> AppResult<impl IntoResponse> {
    super::check_rate_limit(&state, "enhance", user.id)?;

    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let enhanced = state.enhancer.enhance(&input.prompt, input.style).await;
    Ok(Json(ApiResponse::ok(enhanced)))
}
