//! Generation request parameters, limits, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::resolution::Resolution;
use crate::style::StylePreset;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Credits granted to a freshly registered user.
pub const DEFAULT_CREDITS: i32 = 50;
/// Credits consumed per generated image.
pub const CREDITS_PER_IMAGE: i32 = 1;
/// Hard ceiling on images per request.
pub const MAX_IMAGES_PER_GENERATION: i32 = 4;
/// Minimum prompt length in characters.
pub const MIN_PROMPT_LENGTH: usize = 3;
/// Maximum prompt length in characters.
pub const MAX_PROMPT_LENGTH: usize = 2000;
/// Maximum negative prompt length in characters.
pub const MAX_NEGATIVE_PROMPT_LENGTH: usize = 500;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// One generation request's parameters, as validated domain data.
///
/// Also serialized as-is into the job row's `params` column, so the exact
/// request that produced a job can always be recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub style: StylePreset,
    pub resolution: Resolution,
    pub num_images: i32,
    /// 0-100. Mapped to each provider's native quality/guidance parameter.
    pub creativity_level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerationParams {
    /// Validate all field ranges. Violations reject the request before any
    /// state is created.
    pub fn validate(&self) -> Result<(), CoreError> {
        let prompt_len = self.prompt.chars().count();
        if prompt_len < MIN_PROMPT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Prompt must be at least {MIN_PROMPT_LENGTH} characters"
            )));
        }
        if prompt_len > MAX_PROMPT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Prompt must be under {MAX_PROMPT_LENGTH} characters"
            )));
        }
        if let Some(neg) = &self.negative_prompt {
            if neg.chars().count() > MAX_NEGATIVE_PROMPT_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Negative prompt must be under {MAX_NEGATIVE_PROMPT_LENGTH} characters"
                )));
            }
        }
        if self.num_images < 1 || self.num_images > MAX_IMAGES_PER_GENERATION {
            return Err(CoreError::Validation(format!(
                "numImages must be between 1 and {MAX_IMAGES_PER_GENERATION}"
            )));
        }
        if !(0..=100).contains(&self.creativity_level) {
            return Err(CoreError::Validation(
                "creativityLevel must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Credits this request will consume on success.
    pub fn credits_required(&self) -> i32 {
        self.num_images * CREDITS_PER_IMAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> GenerationParams {
        GenerationParams {
            prompt: "a red fox in snow".to_string(),
            negative_prompt: None,
            style: StylePreset::Anime,
            resolution: Resolution::Square1024,
            num_images: 2,
            creativity_level: 70,
            seed: None,
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn short_prompt_rejected() {
        let mut p = valid_params();
        p.prompt = "ab".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn oversized_prompt_rejected() {
        let mut p = valid_params();
        p.prompt = "x".repeat(MAX_PROMPT_LENGTH + 1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn oversized_negative_prompt_rejected() {
        let mut p = valid_params();
        p.negative_prompt = Some("x".repeat(MAX_NEGATIVE_PROMPT_LENGTH + 1));
        assert!(p.validate().is_err());
    }

    #[test]
    fn num_images_bounds() {
        let mut p = valid_params();
        p.num_images = 0;
        assert!(p.validate().is_err());
        p.num_images = MAX_IMAGES_PER_GENERATION;
        assert!(p.validate().is_ok());
        p.num_images = MAX_IMAGES_PER_GENERATION + 1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn creativity_bounds() {
        let mut p = valid_params();
        p.creativity_level = 101;
        assert!(p.validate().is_err());
        p.creativity_level = 0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn credits_scale_with_num_images() {
        let mut p = valid_params();
        p.num_images = 3;
        assert_eq!(p.credits_required(), 3);
    }

    #[test]
    fn params_serialize_camel_free_snake_case() {
        let json = serde_json::to_value(valid_params()).unwrap();
        assert_eq!(json["style"], "anime");
        assert_eq!(json["resolution"], "1024x1024");
        assert!(json.get("seed").is_none());
    }
}
