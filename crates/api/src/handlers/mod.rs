//! HTTP handlers, one module per feature area.

pub mod admin;
pub mod dashboard;
pub mod enhance;
pub mod generation;
pub mod images;

use visionforge_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Consume one rate-limit token for `scope` on behalf of `user_id`, or
/// reject with 429 and a `Retry-After` of one window.
fn check_rate_limit(state: &AppState, scope: &str, user_id: DbId) -> Result<(), AppError> {
    let decision = state.limiter.check(&format!("{scope}:{user_id}"));
    if !decision.allowed {
        tracing::debug!(scope, user_id, "Rate limit exceeded");
        return Err(AppError::RateLimited {
            retry_after_secs: state.limiter.window().as_secs(),
        });
    }
    Ok(())
}
