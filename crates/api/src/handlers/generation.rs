//! Handler for `POST /api/v1/generate`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use visionforge_core::generation::GenerationParams;
use visionforge_core::resolution::Resolution;
use visionforge_core::style::StylePreset;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for a generation. Field names follow the public API's
/// camelCase convention.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub style: StylePreset,
    pub resolution: Resolution,
    #[serde(default = "default_num_images")]
    pub num_images: i32,
    #[serde(default = "default_creativity_level")]
    pub creativity_level: i32,
    pub seed: Option<i64>,
}

fn default_num_images() -> i32 {
    1
}

fn default_creativity_level() -> i32 {
    50
}

impl From<GenerateRequest> for GenerationParams {
    fn from(input: GenerateRequest) -> Self {
        GenerationParams {
            prompt: input.prompt,
            negative_prompt: input.negative_prompt,
            style: input.style,
            resolution: input.resolution,
            num_images: input.num_images,
            creativity_level: input.creativity_level,
            seed: input.seed,
        }
    }
}

/// POST /api/v1/generate
///
/// Runs the full generation lifecycle synchronously and returns the job
/// ID and the persisted images. Validation, the credit pre-check, and
/// the atomic debit all live in the orchestrator; this handler only adds
/// identity and rate limiting.
pub async fn generate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    super::check_rate_limit(&state, "generate", user.id)?;

    let params = GenerationParams::from(input);
    let outcome = state.orchestrator.submit(user.id, &params).await?;

    Ok(Json(ApiResponse::ok(outcome)))
}
