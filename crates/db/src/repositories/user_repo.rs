//! Repository for the `users` table.

use sqlx::PgPool;
use visionforge_core::types::DbId;

use crate::models::status::{UserRole, UserTier};
use crate::models::user::{UpdateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, credits, tier_id, role_id, created_at, updated_at";

/// Provides CRUD and credit operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Current credit balance, or `None` when the user does not exist.
    pub async fn credits_of(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT credits FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically debit `amount` credits if and only if the balance covers
    /// it. Returns `true` on success, `false` when the balance was too low.
    ///
    /// This is a single conditional UPDATE, so concurrent requests from the
    /// same user cannot both pass a separate check and overdraw.
    pub async fn try_debit_credits(
        pool: &PgPool,
        id: DbId,
        amount: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users \
             SET credits = credits - $2, updated_at = NOW() \
             WHERE id = $1 AND credits >= $2",
        )
        .bind(id)
        .bind(amount)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all users, newest first (admin view).
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Apply an admin update (role/tier/credits). Fields left `None` keep
    /// their current value. Returns the updated row, or `None` when the
    /// user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let role_id = input
            .role
            .as_deref()
            .and_then(UserRole::from_name)
            .map(UserRole::id);
        let tier_id = input
            .tier
            .as_deref()
            .and_then(UserTier::from_name)
            .map(UserTier::id);

        let query = format!(
            "UPDATE users \
             SET role_id = COALESCE($2, role_id), \
                 tier_id = COALESCE($3, tier_id), \
                 credits = COALESCE($4, credits), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role_id)
            .bind(tier_id)
            .bind(input.credits)
            .fetch_optional(pool)
            .await
    }
}
