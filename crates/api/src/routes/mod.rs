pub mod health;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST  /generate                 run a generation        (auth, rate limited)
/// POST  /prompt/enhance           enhance a prompt        (auth, rate limited)
///
/// GET   /images                   public gallery
/// POST  /images/{id}/like         toggle like             (auth)
///
/// GET   /dashboard/stats          per-user overview       (auth)
///
/// GET   /admin/analytics          site analytics          (admin)
/// GET   /admin/users              list users              (admin)
/// PATCH /admin/users/{id}         update role/tier/credits (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generation::generate))
        .route("/prompt/enhance", post(handlers::enhance::enhance_prompt))
        .route("/images", get(handlers::images::gallery))
        .route("/images/{id}/like", post(handlers::images::toggle_like))
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/admin/analytics", get(handlers::admin::analytics))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}", patch(handlers::admin::update_user))
}
