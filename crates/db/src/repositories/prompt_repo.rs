//! Repository for the `prompts` table.

use sqlx::PgPool;
use visionforge_core::types::DbId;

use crate::models::prompt::Prompt;

const COLUMNS: &str = "id, text, user_id, created_at";

/// Provides insert/lookup for immutable prompt records.
pub struct PromptRepo;

impl PromptRepo {
    /// Insert a new prompt record. Prompts are never updated afterwards.
    pub async fn create(pool: &PgPool, user_id: DbId, text: &str) -> Result<Prompt, sqlx::Error> {
        let query = format!("INSERT INTO prompts (text, user_id) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(text)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a prompt by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE id = $1");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
