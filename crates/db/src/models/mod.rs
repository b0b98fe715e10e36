//! Entity models and request/response DTOs.

pub mod image;
pub mod job;
pub mod like;
pub mod prompt;
pub mod stats;
pub mod status;
pub mod user;
