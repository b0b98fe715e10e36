//! Domain-level error taxonomy.
//!
//! Everything the pure domain layer can reject is expressed here; the
//! HTTP crate maps these onto status codes in one place.

use crate::types::DbId;

/// Errors produced by domain logic, independent of any transport.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or out-of-range input. Rejected before any state mutates.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An entity lookup by ID came back empty.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The user's credit balance cannot cover the request.
    /// No job record exists when this is raised.
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: i32, available: i32 },

    /// A uniqueness or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected internal failure. Details are logged, never surfaced.
    #[error("Internal error: {0}")]
    Internal(String),
}
