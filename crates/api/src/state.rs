use std::sync::Arc;

use visionforge_core::rate_limit::RateLimiter;
use visionforge_pipeline::{Orchestrator, PromptEnhancer};
use visionforge_queue::GenerationQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Every
/// collaborator is resolved once at startup and injected; handlers never
/// construct providers, stores, or limiters themselves.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: visionforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-user request rate limiter.
    pub limiter: Arc<RateLimiter>,
    /// Generation pipeline orchestrator.
    pub orchestrator: Arc<Orchestrator>,
    /// Prompt enhancer (AI-backed or rule-based).
    pub enhancer: Arc<PromptEnhancer>,
    /// Job queue (durable or in-memory).
    pub queue: Arc<GenerationQueue>,
}
