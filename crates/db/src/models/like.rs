//! Like entity model.
//!
//! A like is the (user, image) pair itself: toggling creates or deletes
//! the row, there is no boolean flag to flip. Uniqueness is enforced by
//! `uq_likes_user_image`.

use sqlx::FromRow;
use visionforge_core::types::{DbId, Timestamp};

/// A row from the `likes` table.
#[derive(Debug, Clone, FromRow)]
pub struct Like {
    pub id: DbId,
    pub user_id: DbId,
    pub image_id: DbId,
    pub created_at: Timestamp,
}
