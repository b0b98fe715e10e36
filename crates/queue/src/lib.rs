//! Best-effort asynchronous job dispatch.
//!
//! Two variants behind one front: a Redis-backed durable queue used when a
//! broker is configured and the process runs in production mode, and an
//! in-memory queue that invokes the handler synchronously inside
//! `enqueue`. Selection happens once at startup; any broker setup failure
//! logs and falls back to memory.
//!
//! The request path submits generations synchronously and does not depend
//! on the queue for correctness; the queue exists for scale-out.

pub mod memory;
pub mod redis_queue;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use visionforge_core::generation::GenerationParams;
use visionforge_core::types::{DbId, Timestamp};

pub use memory::MemoryQueue;
pub use redis_queue::RedisQueue;

/// One queued generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: Uuid,
    pub user_id: DbId,
    pub params: GenerationParams,
    pub created_at: Timestamp,
}

impl QueueJob {
    pub fn new(user_id: DbId, params: GenerationParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            params,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Callback invoked for each dequeued job.
pub type JobHandler = Arc<dyn Fn(QueueJob) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Errors from queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue broker error: {0}")]
    Broker(#[from] redis::RedisError),

    #[error("Job handler failed: {0}")]
    Handler(String),
}

/// The queue front handed to the rest of the application.
pub enum GenerationQueue {
    Memory(MemoryQueue),
    Redis(RedisQueue),
}

impl GenerationQueue {
    /// Select a variant from the environment.
    ///
    /// The durable path is taken only when `REDIS_URL` is set, the process
    /// is in production mode, and the initial connection succeeds;
    /// otherwise the in-memory queue is used.
    pub async fn from_env(production: bool) -> Self {
        let Ok(redis_url) = std::env::var("REDIS_URL") else {
            return Self::Memory(MemoryQueue::new());
        };
        if !production {
            tracing::debug!("Not in production mode; using in-memory queue");
            return Self::Memory(MemoryQueue::new());
        }
        match RedisQueue::connect(&redis_url).await {
            Ok(queue) => {
                tracing::info!("Connected to Redis job queue");
                Self::Redis(queue)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, falling back to in-memory queue");
                Self::Memory(MemoryQueue::new())
            }
        }
    }

    /// Register the handler invoked for dequeued jobs.
    pub fn set_handler(&self, handler: JobHandler) {
        match self {
            Self::Memory(queue) => queue.set_handler(handler),
            Self::Redis(queue) => queue.set_handler(handler),
        }
    }

    /// Enqueue a job, returning its ID.
    ///
    /// The memory variant runs the handler to completion before
    /// returning; the Redis variant returns as soon as the payload is
    /// pushed.
    pub async fn enqueue(&self, job: QueueJob) -> Result<Uuid, QueueError> {
        match self {
            Self::Memory(queue) => queue.enqueue(job).await,
            Self::Redis(queue) => queue.enqueue(job).await,
        }
    }
}
