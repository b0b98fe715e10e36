//! The generation lifecycle, end to end.
//!
//! Submission order matters and is fixed:
//!
//! 1. validate parameters
//! 2. advisory credit pre-check (cheap rejection before any writes)
//! 3. record the prompt, then a Processing job
//! 4. call the provider
//! 5. upload each artifact, then insert its image row
//! 6. mark the job Completed
//! 7. atomically debit credits
//!
//! Failure in step 4 or 5 marks the job Failed exactly once and, for
//! step 5, rolls back already-uploaded objects and image rows so a job
//! never completes with fewer images than requested. The debit in step 7
//! is a conditional update, so a concurrent spend can never push the
//! balance negative; the pre-check only exists to reject early.

use std::sync::Arc;

use visionforge_core::error::CoreError;
use visionforge_core::generation::GenerationParams;
use visionforge_core::types::DbId;
use visionforge_providers::{ImageProvider, ImageRequest};
use visionforge_storage::ObjectStore;

use crate::store::{GeneratedImage, GenerationStore, ImageSpec, JobSpec};
use crate::PipelineError;

/// The caller-facing result of a successful generation.
#[derive(Debug, serde::Serialize)]
pub struct GenerationOutcome {
    pub job_id: DbId,
    pub images: Vec<GeneratedImage>,
    pub credits_used: i32,
}

/// Drives one generation request through its full lifecycle.
pub struct Orchestrator {
    store: Arc<dyn GenerationStore>,
    provider: Arc<dyn ImageProvider>,
    storage: Arc<dyn ObjectStore>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        provider: Arc<dyn ImageProvider>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            provider,
            storage,
        }
    }

    /// Run one generation request for `user_id`.
    pub async fn submit(
        &self,
        user_id: DbId,
        params: &GenerationParams,
    ) -> Result<GenerationOutcome, PipelineError> {
        params.validate()?;

        let required = params.credits_required();
        let available = self
            .store
            .credits_of(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;
        if available < required {
            return Err(CoreError::InsufficientCredits {
                required,
                available,
            }
            .into());
        }

        let prompt_id = self.store.create_prompt(user_id, &params.prompt).await?;
        let job_id = self
            .store
            .create_job(&JobSpec {
                user_id,
                prompt_id,
                prompt: params.prompt.clone(),
                params: serde_json::to_value(params)
                    .map_err(|e| CoreError::Internal(e.to_string()))?,
                num_images: params.num_images,
            })
            .await?;

        tracing::info!(
            job_id,
            user_id,
            provider = self.provider.name(),
            num_images = params.num_images,
            "Starting generation"
        );

        // Providers apply the style prefix themselves; the request carries
        // the raw prompt so the stored prompt and the job row stay exact.
        let request = ImageRequest::from(params);

        let buffers = match self.provider.generate(&request).await {
            Ok(buffers) => buffers,
            Err(e) => {
                tracing::warn!(job_id, error = %e, "Provider failed, failing job");
                self.store.fail_job(job_id, &e.to_string()).await?;
                return Err(e.into());
            }
        };

        let images = match self.persist_artifacts(user_id, prompt_id, job_id, params, buffers).await
        {
            Ok(images) => images,
            Err(e) => {
                self.store.fail_job(job_id, &e.to_string()).await?;
                return Err(e);
            }
        };

        self.store.complete_job(job_id).await?;

        // The job stands regardless of the debit outcome; a false here
        // means a concurrent spend drained the balance after the
        // pre-check, and the conditional update keeps it at zero or above.
        if !self.store.try_debit_credits(user_id, required).await? {
            tracing::warn!(job_id, user_id, required, "Post-completion debit found insufficient balance");
        }

        tracing::info!(job_id, images = images.len(), "Generation completed");

        Ok(GenerationOutcome {
            job_id,
            images,
            credits_used: required,
        })
    }

    /// Upload every buffer and insert its row. On any failure, delete the
    /// objects and rows written so far, then return the original error.
    async fn persist_artifacts(
        &self,
        user_id: DbId,
        prompt_id: DbId,
        job_id: DbId,
        params: &GenerationParams,
        buffers: Vec<Vec<u8>>,
    ) -> Result<Vec<GeneratedImage>, PipelineError> {
        let (width, height) = params.resolution.dimensions();
        let mut images = Vec::with_capacity(buffers.len());
        let mut uploaded_keys: Vec<String> = Vec::with_capacity(buffers.len());

        for (index, bytes) in buffers.into_iter().enumerate() {
            let filename = format!("{job_id}-{index}.png");
            let result = async {
                let stored = self.storage.upload(bytes, &filename, "image/png").await?;
                uploaded_keys.push(stored.key.clone());
                let image = self
                    .store
                    .create_image(&ImageSpec {
                        url: stored.url,
                        storage_key: stored.key,
                        width: width as i32,
                        height: height as i32,
                        style: params.style.slug().to_string(),
                        user_id,
                        prompt_id,
                        job_id,
                    })
                    .await?;
                Ok::<_, PipelineError>(image)
            }
            .await;

            match result {
                Ok(image) => images.push(image),
                Err(e) => {
                    tracing::warn!(job_id, index, error = %e, "Artifact persistence failed, rolling back");
                    self.rollback(job_id, &uploaded_keys).await;
                    return Err(e);
                }
            }
        }
        Ok(images)
    }

    /// Best-effort cleanup after a partial failure: delete uploaded
    /// objects and any image rows for the job. Cleanup errors are logged,
    /// not propagated, so the original failure stays the reported one.
    async fn rollback(&self, job_id: DbId, uploaded_keys: &[String]) {
        for key in uploaded_keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::error!(job_id, key, error = %e, "Rollback delete failed");
            }
        }
        if let Err(e) = self.store.delete_job_images(job_id).await {
            tracing::error!(job_id, error = %e, "Rollback image row cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use visionforge_core::resolution::Resolution;
    use visionforge_core::style::StylePreset;
    use visionforge_providers::ProviderError;
    use visionforge_storage::{MemoryStore, StorageError, StoredObject};

    use super::*;

    fn params(num_images: i32) -> GenerationParams {
        GenerationParams {
            prompt: "a red fox in snow".to_string(),
            negative_prompt: None,
            style: StylePreset::Anime,
            resolution: Resolution::Square512,
            num_images,
            creativity_level: 50,
            seed: None,
        }
    }

    /// In-memory store tracking every orchestrator write.
    #[derive(Default)]
    struct FakeStore {
        credits: Mutex<i32>,
        next_id: AtomicI64,
        prompts: Mutex<Vec<String>>,
        jobs: Mutex<Vec<JobSpec>>,
        images: Mutex<Vec<ImageSpec>>,
        completed: Mutex<Vec<DbId>>,
        failed: Mutex<Vec<(DbId, String)>>,
    }

    impl FakeStore {
        fn with_credits(credits: i32) -> Self {
            let store = Self::default();
            *store.credits.lock().unwrap() = credits;
            store
        }

        fn credits(&self) -> i32 {
            *self.credits.lock().unwrap()
        }

        fn next_id(&self) -> DbId {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    #[async_trait]
    impl GenerationStore for FakeStore {
        async fn credits_of(&self, _user_id: DbId) -> Result<Option<i32>, sqlx::Error> {
            Ok(Some(self.credits()))
        }

        async fn try_debit_credits(
            &self,
            _user_id: DbId,
            amount: i32,
        ) -> Result<bool, sqlx::Error> {
            let mut credits = self.credits.lock().unwrap();
            if *credits >= amount {
                *credits -= amount;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn create_prompt(&self, _user_id: DbId, text: &str) -> Result<DbId, sqlx::Error> {
            self.prompts.lock().unwrap().push(text.to_string());
            Ok(self.next_id())
        }

        async fn create_job(&self, spec: &JobSpec) -> Result<DbId, sqlx::Error> {
            self.jobs.lock().unwrap().push(spec.clone());
            Ok(self.next_id())
        }

        async fn create_image(&self, spec: &ImageSpec) -> Result<GeneratedImage, sqlx::Error> {
            self.images.lock().unwrap().push(spec.clone());
            Ok(GeneratedImage {
                id: self.next_id(),
                url: spec.url.clone(),
                width: spec.width,
                height: spec.height,
                created_at: chrono::Utc::now(),
            })
        }

        async fn complete_job(&self, job_id: DbId) -> Result<(), sqlx::Error> {
            self.completed.lock().unwrap().push(job_id);
            Ok(())
        }

        async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
            self.failed.lock().unwrap().push((job_id, error.to_string()));
            Ok(())
        }

        async fn delete_job_images(&self, job_id: DbId) -> Result<u64, sqlx::Error> {
            let mut images = self.images.lock().unwrap();
            let before = images.len();
            images.retain(|image| image.job_id != job_id);
            Ok((before - images.len()) as u64)
        }
    }

    /// Provider returning fixed buffers, or failing when told to.
    struct FakeProvider {
        fail: bool,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn ok() -> Self {
            Self {
                fail: false,
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                seen_prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "Fake"
        }

        async fn generate(&self, request: &ImageRequest) -> Result<Vec<Vec<u8>>, ProviderError> {
            self.seen_prompts.lock().unwrap().push(request.prompt.clone());
            if self.fail {
                return Err(ProviderError::Upstream {
                    provider: "Fake",
                    status: 500,
                    message: "model overloaded".to_string(),
                });
            }
            Ok((0..request.count).map(|i| vec![i as u8; 8]).collect())
        }
    }

    /// Storage wrapper that fails the Nth upload (0-based).
    struct FailingStore {
        inner: MemoryStore,
        fail_at: usize,
        uploads: AtomicUsize,
    }

    impl FailingStore {
        fn new(fail_at: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_at,
                uploads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        fn name(&self) -> &'static str {
            "Failing"
        }

        async fn upload(
            &self,
            bytes: Vec<u8>,
            filename: &str,
            content_type: &str,
        ) -> Result<StoredObject, StorageError> {
            let index = self.uploads.fetch_add(1, Ordering::SeqCst);
            if index == self.fail_at {
                return Err(StorageError::Backend {
                    backend: "Failing",
                    message: "bucket unavailable".to_string(),
                });
            }
            self.inner.upload(bytes, filename, content_type).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
    }

    fn orchestrator(
        store: Arc<FakeStore>,
        provider: Arc<FakeProvider>,
        storage: Arc<dyn ObjectStore>,
    ) -> Orchestrator {
        Orchestrator::new(store, provider, storage)
    }

    #[tokio::test]
    async fn successful_generation_debits_and_completes() {
        let store = Arc::new(FakeStore::with_credits(10));
        let provider = Arc::new(FakeProvider::ok());
        let orch = orchestrator(
            Arc::clone(&store),
            Arc::clone(&provider),
            Arc::new(MemoryStore::new()),
        );

        let outcome = orch.submit(1, &params(3)).await.unwrap();

        assert_eq!(outcome.images.len(), 3);
        assert_eq!(outcome.credits_used, 3);
        assert_eq!(store.credits(), 7);
        assert_eq!(store.completed.lock().unwrap().len(), 1);
        assert!(store.failed.lock().unwrap().is_empty());
        // The provider receives the raw prompt; style prefixing is its job.
        let seen = provider.seen_prompts.lock().unwrap();
        assert_eq!(seen[0], "a red fox in snow");
    }

    #[tokio::test]
    async fn invalid_params_create_no_state() {
        let store = Arc::new(FakeStore::with_credits(10));
        let orch = orchestrator(
            Arc::clone(&store),
            Arc::new(FakeProvider::ok()),
            Arc::new(MemoryStore::new()),
        );

        let mut bad = params(1);
        bad.prompt = "ab".to_string();
        let result = orch.submit(1, &bad).await;

        assert_matches!(result, Err(PipelineError::Core(CoreError::Validation(_))));
        assert!(store.jobs.lock().unwrap().is_empty());
        assert!(store.prompts.lock().unwrap().is_empty());
        assert_eq!(store.credits(), 10);
    }

    #[tokio::test]
    async fn insufficient_credits_rejected_before_job_creation() {
        let store = Arc::new(FakeStore::with_credits(2));
        let orch = orchestrator(
            Arc::clone(&store),
            Arc::new(FakeProvider::ok()),
            Arc::new(MemoryStore::new()),
        );

        let result = orch.submit(1, &params(3)).await;

        assert_matches!(
            result,
            Err(PipelineError::Core(CoreError::InsufficientCredits {
                required: 3,
                available: 2,
            }))
        );
        assert!(store.jobs.lock().unwrap().is_empty());
        assert_eq!(store.credits(), 2);
    }

    #[tokio::test]
    async fn provider_failure_fails_job_without_debit() {
        let store = Arc::new(FakeStore::with_credits(10));
        let orch = orchestrator(
            Arc::clone(&store),
            Arc::new(FakeProvider::failing()),
            Arc::new(MemoryStore::new()),
        );

        let result = orch.submit(1, &params(2)).await;

        assert_matches!(result, Err(PipelineError::Provider(_)));
        let failed = store.failed.lock().unwrap();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].1.contains("model overloaded"));
        assert!(store.completed.lock().unwrap().is_empty());
        assert!(store.images.lock().unwrap().is_empty());
        assert_eq!(store.credits(), 10);
    }

    #[tokio::test]
    async fn partial_upload_failure_rolls_back_earlier_artifacts() {
        let store = Arc::new(FakeStore::with_credits(10));
        let storage = Arc::new(FailingStore::new(2));
        let orch = Orchestrator::new(
            Arc::clone(&store) as Arc<dyn GenerationStore>,
            Arc::new(FakeProvider::ok()),
            Arc::clone(&storage) as Arc<dyn ObjectStore>,
        );

        let result = orch.submit(1, &params(3)).await;

        assert_matches!(result, Err(PipelineError::Storage(_)));
        // The two objects uploaded before the failure were deleted.
        assert!(storage.inner.is_empty());
        // Their image rows were removed as well.
        assert!(store.images.lock().unwrap().is_empty());
        assert_eq!(store.failed.lock().unwrap().len(), 1);
        assert!(store.completed.lock().unwrap().is_empty());
        assert_eq!(store.credits(), 10);
    }

    #[tokio::test]
    async fn concurrent_drain_after_precheck_does_not_fail_the_job() {
        // Balance passes the pre-check, then the debit finds it short.
        struct DrainedStore(FakeStore);

        #[async_trait]
        impl GenerationStore for DrainedStore {
            async fn credits_of(&self, user_id: DbId) -> Result<Option<i32>, sqlx::Error> {
                self.0.credits_of(user_id).await
            }
            async fn try_debit_credits(&self, _: DbId, _: i32) -> Result<bool, sqlx::Error> {
                Ok(false)
            }
            async fn create_prompt(&self, user_id: DbId, text: &str) -> Result<DbId, sqlx::Error> {
                self.0.create_prompt(user_id, text).await
            }
            async fn create_job(&self, spec: &JobSpec) -> Result<DbId, sqlx::Error> {
                self.0.create_job(spec).await
            }
            async fn create_image(&self, spec: &ImageSpec) -> Result<GeneratedImage, sqlx::Error> {
                self.0.create_image(spec).await
            }
            async fn complete_job(&self, job_id: DbId) -> Result<(), sqlx::Error> {
                self.0.complete_job(job_id).await
            }
            async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
                self.0.fail_job(job_id, error).await
            }
            async fn delete_job_images(&self, job_id: DbId) -> Result<u64, sqlx::Error> {
                self.0.delete_job_images(job_id).await
            }
        }

        let store = Arc::new(DrainedStore(FakeStore::with_credits(10)));
        let orch = Orchestrator::new(
            Arc::clone(&store) as Arc<dyn GenerationStore>,
            Arc::new(FakeProvider::ok()),
            Arc::new(MemoryStore::new()),
        );

        let outcome = orch.submit(1, &params(1)).await.unwrap();
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(store.0.completed.lock().unwrap().len(), 1);
    }
}
