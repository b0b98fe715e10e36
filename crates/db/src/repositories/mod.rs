//! Repository structs: one per table, associated async functions taking
//! `&PgPool`.

pub mod analytics_repo;
pub mod image_repo;
pub mod job_repo;
pub mod like_repo;
pub mod prompt_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use image_repo::ImageRepo;
pub use job_repo::JobRepo;
pub use like_repo::LikeRepo;
pub use prompt_repo::PromptRepo;
pub use user_repo::UserRepo;
