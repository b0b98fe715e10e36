//! Generation pipeline: orchestrator, persistence seam, and prompt
//! enhancer.
//!
//! The orchestrator owns the full lifecycle of one generation request:
//! validate, pre-check credits, record a job, call the provider, upload
//! artifacts, record image rows, complete the job, debit credits. The
//! persistence seam ([`store::GenerationStore`]) keeps it testable
//! without a live database.

pub mod enhancer;
pub mod orchestrator;
pub mod store;

use visionforge_core::error::CoreError;
use visionforge_providers::ProviderError;
use visionforge_storage::StorageError;

pub use enhancer::PromptEnhancer;
pub use orchestrator::{GenerationOutcome, Orchestrator};
pub use store::{GenerationStore, PgGenerationStore};

/// Errors from any stage of the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
