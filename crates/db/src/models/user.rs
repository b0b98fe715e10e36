//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use visionforge_core::types::{DbId, Timestamp};

use super::status::{StatusId, UserRole, UserTier};

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub credits: i32,
    pub tier_id: StatusId,
    pub role_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> UserRole {
        match self.role_id {
            2 => UserRole::Admin,
            _ => UserRole::User,
        }
    }

    pub fn tier(&self) -> UserTier {
        match self.tier_id {
            2 => UserTier::Pro,
            3 => UserTier::Enterprise,
            _ => UserTier::Free,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

/// User representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub credits: i32,
    /// Tier name (`"FREE"`, `"PRO"`, `"ENTERPRISE"`).
    pub tier: &'static str,
    /// Role name (`"USER"`, `"ADMIN"`).
    pub role: &'static str,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let tier = user.tier().as_str();
        let role = user.role().as_str();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            credits: user.credits,
            tier,
            role,
            created_at: user.created_at,
        }
    }
}

/// DTO for the admin user-update endpoint. All fields optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    /// Role name (`"USER"` or `"ADMIN"`).
    pub role: Option<String>,
    /// Tier name (`"FREE"`, `"PRO"`, `"ENTERPRISE"`).
    pub tier: Option<String>,
    /// Absolute credit balance. Must be non-negative.
    pub credits: Option<i32>,
}
