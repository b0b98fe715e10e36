//! OpenAI (DALL-E) image provider.
//!
//! The images endpoint generates one image per call, so batches loop
//! `count` sequential requests with `n = 1`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use visionforge_core::style::styled_prompt;

use crate::{ImageProvider, ImageRequest, ProviderError};

const PROVIDER_NAME: &str = "OpenAI";
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/images/generations";
const MODEL: &str = "dall-e-3";
/// Creativity level above which HD quality is requested.
const HD_THRESHOLD: i32 = 70;

/// DALL-E backed [`ImageProvider`].
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Override the endpoint, for self-hosted OpenAI-compatible servers.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Quality tier derived from the creativity level.
    fn quality(creativity_level: i32) -> &'static str {
        if creativity_level > HD_THRESHOLD {
            "hd"
        } else {
            "standard"
        }
    }

    /// Body for one single-image request.
    fn request_body(request: &ImageRequest) -> serde_json::Value {
        serde_json::json!({
            "model": MODEL,
            "prompt": styled_prompt(request.style, &request.prompt),
            "n": 1,
            "size": format!("{}x{}", request.width, request.height),
            "quality": Self::quality(request.creativity_level),
            "response_format": "b64_json",
        })
    }

    async fn generate_one(&self, request: &ImageRequest) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| ProviderError::Request {
                provider: PROVIDER_NAME,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.error.and_then(|b| b.message))
                .unwrap_or_else(|| status.to_string());
            return Err(ProviderError::Upstream {
                provider: PROVIDER_NAME,
                status: status.as_u16(),
                message,
            });
        }

        let body: ImagesResponse =
            response.json().await.map_err(|e| ProviderError::Request {
                provider: PROVIDER_NAME,
                message: format!("invalid response body: {e}"),
            })?;
        let first = body.data.into_iter().next().ok_or(ProviderError::Request {
            provider: PROVIDER_NAME,
            message: "response contained no images".to_string(),
        })?;

        BASE64
            .decode(first.b64_json)
            .map_err(|e| ProviderError::Request {
                provider: PROVIDER_NAME,
                message: format!("invalid base64 payload: {e}"),
            })
    }
}

#[async_trait::async_trait]
impl ImageProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<Vec<u8>>, ProviderError> {
        let mut buffers = Vec::with_capacity(request.count as usize);
        for index in 0..request.count {
            tracing::debug!(index, count = request.count, "Requesting DALL-E image");
            buffers.push(self.generate_one(request).await?);
        }
        Ok(buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionforge_core::style::StylePreset;

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "a red fox in snow".to_string(),
            negative_prompt: None,
            style: StylePreset::Anime,
            width: 1024,
            height: 1024,
            count: 2,
            creativity_level: 70,
            seed: None,
        }
    }

    #[test]
    fn quality_is_hd_above_threshold_only() {
        assert_eq!(OpenAiProvider::quality(70), "standard");
        assert_eq!(OpenAiProvider::quality(71), "hd");
        assert_eq!(OpenAiProvider::quality(100), "hd");
        assert_eq!(OpenAiProvider::quality(0), "standard");
    }

    #[test]
    fn body_prepends_style_prefix_and_requests_single_image() {
        let body = OpenAiProvider::request_body(&request());
        assert_eq!(
            body["prompt"],
            "Anime style illustration, a red fox in snow"
        );
        assert_eq!(body["n"], 1);
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["quality"], "standard");
        assert_eq!(body["response_format"], "b64_json");
    }
}
