//! Redis-backed durable queue variant.
//!
//! Producers LPUSH serialized jobs onto a list; a worker loop BRPOPs and
//! invokes the handler with bounded retry. Delivery is at-least-once: a
//! crash between BRPOP and handler completion loses nothing upstream but
//! may re-run a handler that partially completed.

use std::sync::Mutex;
use std::time::Duration;

use redis::AsyncCommands;
use uuid::Uuid;

use crate::{JobHandler, QueueError, QueueJob};

/// List key holding pending generation jobs.
const QUEUE_KEY: &str = "visionforge:generation";
/// Attempts per job, including the first.
const MAX_ATTEMPTS: u32 = 3;
/// Base backoff; doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_secs(2);
/// BRPOP block timeout; the loop wakes this often to check for shutdown.
const POP_TIMEOUT_SECS: f64 = 5.0;

/// Redis list backed queue.
pub struct RedisQueue {
    client: redis::Client,
    handler: Mutex<Option<JobHandler>>,
}

impl RedisQueue {
    /// Open a client and verify the broker responds before committing to
    /// the durable path.
    pub async fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Broker)?;
        let mut con = client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Broker)?;
        redis::cmd("PING")
            .query_async::<()>(&mut con)
            .await
            .map_err(QueueError::Broker)?;
        Ok(Self {
            client,
            handler: Mutex::new(None),
        })
    }

    pub fn set_handler(&self, handler: JobHandler) {
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    /// Push a job onto the list and return immediately.
    pub async fn enqueue(&self, job: QueueJob) -> Result<Uuid, QueueError> {
        let payload = serde_json::to_string(&job)?;
        let mut con = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Broker)?;
        con.lpush::<_, _, ()>(QUEUE_KEY, payload)
            .await
            .map_err(QueueError::Broker)?;
        tracing::debug!(job_id = %job.id, "Enqueued generation job");
        Ok(job.id)
    }

    /// Consume jobs until the connection fails terminally.
    ///
    /// Each job gets up to [`MAX_ATTEMPTS`] handler invocations with
    /// exponential backoff; a job that exhausts its attempts is dropped
    /// with an error log rather than blocking the queue.
    pub async fn run_worker(&self) -> Result<(), QueueError> {
        let mut con = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Broker)?;

        loop {
            let popped: Option<(String, String)> = con
                .brpop(QUEUE_KEY, POP_TIMEOUT_SECS)
                .await
                .map_err(QueueError::Broker)?;
            let Some((_, payload)) = popped else {
                continue;
            };

            let job: QueueJob = match serde_json::from_str(&payload) {
                Ok(job) => job,
                Err(e) => {
                    tracing::error!(error = %e, "Dropping undecodable queue payload");
                    continue;
                }
            };

            let handler = self
                .handler
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            let Some(handler) = handler else {
                tracing::error!(job_id = %job.id, "No handler registered, dropping job");
                continue;
            };

            self.process_with_retry(handler, job).await;
        }
    }

    async fn process_with_retry(&self, handler: JobHandler, job: QueueJob) {
        let job_id = job.id;
        let mut backoff = BACKOFF_BASE;

        for attempt in 1..=MAX_ATTEMPTS {
            match handler(job.clone()).await {
                Ok(()) => {
                    tracing::info!(job_id = %job_id, attempt, "Queue job handled");
                    return;
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(job_id = %job_id, attempt, error = %e, "Job failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    tracing::error!(job_id = %job_id, attempt, error = %e, "Job failed permanently");
                }
            }
        }
    }
}
