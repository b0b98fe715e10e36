//! Image entity model and gallery DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use visionforge_core::types::{DbId, Timestamp};

/// A row from the `images` table.
///
/// Rows exist only for successfully uploaded artifacts; a failed upload
/// never leaves a row behind.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub url: String,
    pub storage_key: String,
    pub width: i32,
    pub height: i32,
    pub style: String,
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub job_id: DbId,
    pub created_at: Timestamp,
}

/// Fields required to insert an image row after a successful upload.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub storage_key: String,
    pub width: i32,
    pub height: i32,
    pub style: String,
    pub user_id: DbId,
    pub prompt_id: DbId,
    pub job_id: DbId,
}

/// Gallery sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GallerySort {
    #[default]
    Latest,
    Popular,
    Oldest,
}

/// Query parameters for `GET /api/v1/images`.
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub style: Option<String>,
    #[serde(default)]
    pub sort: GallerySort,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One gallery entry: image plus its like count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GalleryImage {
    pub id: DbId,
    pub url: String,
    pub width: i32,
    pub height: i32,
    pub style: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub like_count: i64,
}
