//! In-memory queue variant: synchronous dispatch, no persistence.

use std::sync::Mutex;

use uuid::Uuid;

use crate::{JobHandler, QueueError, QueueJob};

/// Queue that invokes the handler inline within `enqueue`.
///
/// Jobs enqueued before a handler is registered are buffered and drained
/// on the next enqueue after registration.
#[derive(Default)]
pub struct MemoryQueue {
    handler: Mutex<Option<JobHandler>>,
    pending: Mutex<Vec<QueueJob>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_handler(&self, handler: JobHandler) {
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    /// Jobs waiting for a handler.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub async fn enqueue(&self, job: QueueJob) -> Result<Uuid, QueueError> {
        let job_id = job.id;
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let Some(handler) = handler else {
            self.pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(job);
            return Ok(job_id);
        };

        // Drain anything buffered before the handler existed, then the
        // new job, all inline.
        let mut batch: Vec<QueueJob> =
            std::mem::take(&mut *self.pending.lock().unwrap_or_else(|e| e.into_inner()));
        batch.push(job);

        for queued in batch {
            let queued_id = queued.id;
            handler(queued)
                .await
                .map_err(|e| QueueError::Handler(format!("job {queued_id}: {e}")))?;
        }
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use visionforge_core::generation::GenerationParams;
    use visionforge_core::resolution::Resolution;
    use visionforge_core::style::StylePreset;

    use super::*;

    fn job() -> QueueJob {
        QueueJob::new(
            1,
            GenerationParams {
                prompt: "a red fox in snow".to_string(),
                negative_prompt: None,
                style: StylePreset::Anime,
                resolution: Resolution::Square512,
                num_images: 1,
                creativity_level: 50,
                seed: None,
            },
        )
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> JobHandler {
        Arc::new(move |_job| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn enqueue_dispatches_synchronously() {
        let queue = MemoryQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        queue.set_handler(counting_handler(Arc::clone(&counter)));

        queue.enqueue(job()).await.unwrap();
        // Handler has already run by the time enqueue returns.
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn jobs_before_handler_are_buffered_then_drained() {
        let queue = MemoryQueue::new();
        queue.enqueue(job()).await.unwrap();
        assert_eq!(queue.pending_len(), 1);

        let counter = Arc::new(AtomicUsize::new(0));
        queue.set_handler(counting_handler(Arc::clone(&counter)));
        queue.enqueue(job()).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(queue.pending_len(), 0);
    }

    #[tokio::test]
    async fn handler_failure_surfaces_as_queue_error() {
        let queue = MemoryQueue::new();
        queue.set_handler(Arc::new(|_job| {
            Box::pin(async { Err(anyhow::anyhow!("provider down")) })
        }));

        let result = queue.enqueue(job()).await;
        assert_matches!(result, Err(QueueError::Handler(_)));
    }
}
