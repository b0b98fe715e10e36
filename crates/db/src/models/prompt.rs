//! Prompt entity model.
//!
//! Prompts are immutable: one row per generation request, created before
//! the job row, never updated.

use sqlx::FromRow;
use visionforge_core::types::{DbId, Timestamp};

/// A row from the `prompts` table.
#[derive(Debug, Clone, FromRow)]
pub struct Prompt {
    pub id: DbId,
    pub text: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}
