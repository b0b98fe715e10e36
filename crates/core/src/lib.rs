//! Domain logic for the VisionForge image generation platform.
//!
//! Pure, dependency-light building blocks shared by every other crate:
//! the error taxonomy, style presets and their prompt tables, resolution
//! parsing, generation parameter validation, the token-bucket rate
//! limiter, and the deterministic rule-based prompt enhancer.

pub mod enhance;
pub mod error;
pub mod generation;
pub mod rate_limit;
pub mod resolution;
pub mod style;
pub mod types;
