//! Pluggable text-to-image generation providers.
//!
//! Each provider implements [`ImageProvider`]: style-prefixed prompt in,
//! exactly `count` raw image byte buffers out. Which provider runs is a
//! process-start decision made by [`build_provider`]; callers only ever
//! see the trait object, never the selection logic.

pub mod huggingface;
pub mod openai;
pub mod stability;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use visionforge_core::generation::GenerationParams;
use visionforge_core::style::StylePreset;

pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;
pub use stability::StabilityProvider;

/// Default deadline for one upstream generation call.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from an upstream generation API.
///
/// The orchestrator does not retry these in the synchronous path; they
/// fail the job and propagate.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Missing API key or malformed provider configuration. Raised at
    /// startup by [`build_provider`], never mid-request.
    #[error("Provider not configured: {0}")]
    Configuration(String),

    /// The provider returned a non-success status.
    #[error("{provider} API error ({status}): {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Network failure, timeout, or an unparseable response body.
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Request / trait
// ---------------------------------------------------------------------------

/// A provider-facing generation request with resolved pixel dimensions.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub style: StylePreset,
    pub width: u32,
    pub height: u32,
    pub count: u32,
    /// 0-100, mapped to each provider's native quality/guidance parameter.
    pub creativity_level: i32,
    pub seed: Option<i64>,
}

impl From<&GenerationParams> for ImageRequest {
    fn from(params: &GenerationParams) -> Self {
        let (width, height) = params.resolution.dimensions();
        Self {
            prompt: params.prompt.clone(),
            negative_prompt: params.negative_prompt.clone(),
            style: params.style,
            width,
            height,
            count: params.num_images as u32,
            creativity_level: params.creativity_level,
            seed: params.seed,
        }
    }
}

/// Uniform contract over external text-to-image APIs.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short provider name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Generate exactly `request.count` images, returned as raw byte
    /// buffers in generation order.
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<Vec<u8>>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which provider backend to use. Decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Stability,
    HuggingFace,
}

/// Provider selection and credentials, loaded from the environment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                 | Default   |
    /// |-------------------------|-----------|
    /// | `AI_PROVIDER`           | `openai`  |
    /// | `OPENAI_API_KEY` / `STABILITY_API_KEY` / `HUGGINGFACE_API_KEY` | unset |
    /// | `PROVIDER_TIMEOUT_SECS` | `120`     |
    pub fn from_env() -> Self {
        let kind = match std::env::var("AI_PROVIDER").as_deref() {
            Ok("stability") => ProviderKind::Stability,
            Ok("huggingface") => ProviderKind::HuggingFace,
            _ => ProviderKind::OpenAi,
        };
        let key_var = match kind {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Stability => "STABILITY_API_KEY",
            ProviderKind::HuggingFace => "HUGGINGFACE_API_KEY",
        };
        let timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            kind,
            api_key: std::env::var(key_var).ok(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Resolve the configured provider into a trait object.
///
/// Fails fast when the selected provider has no API key, instead of
/// failing the first job at request time.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ImageProvider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::Configuration(format!("API key for {:?} is not set", config.kind))
    })?;

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("HTTP client: {e}")))?;

    Ok(match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(client, api_key)),
        ProviderKind::Stability => Arc::new(StabilityProvider::new(client, api_key)),
        ProviderKind::HuggingFace => Arc::new(HuggingFaceProvider::new(client, api_key)),
    })
}
