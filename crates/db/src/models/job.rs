//! Generation job entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use visionforge_core::types::{DbId, Timestamp};

use super::status::{JobStatus, StatusId};

/// A row from the `generation_jobs` table.
///
/// `params` holds the exact validated request as JSON; `prompt` is a text
/// snapshot so job listings don't need a join against `prompts`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationJob {
    pub id: DbId,
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub prompt: String,
    pub params: serde_json::Value,
    pub num_images: i32,
    pub status_id: StatusId,
    pub error: Option<String>,
    pub credits_used: i32,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl GenerationJob {
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_id(self.status_id)
    }
}

/// Fields required to insert a new job row (always status PROCESSING).
#[derive(Debug)]
pub struct NewJob<'a> {
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub prompt: &'a str,
    pub params: serde_json::Value,
    pub num_images: i32,
}
