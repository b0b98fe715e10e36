//! HuggingFace inference-API image provider.
//!
//! The inference endpoint returns one raw image per call and has no native
//! seed parameter, so the seed is appended to the prompt text and batches
//! loop `count` requests.

use rand::Rng;
use visionforge_core::style::styled_prompt;

use crate::{ImageProvider, ImageRequest, ProviderError};

const PROVIDER_NAME: &str = "HuggingFace";
const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";
/// Random seed upper bound when the request carries none.
const RANDOM_SEED_RANGE: i64 = 100_000;

/// HuggingFace inference backed [`ImageProvider`].
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl HuggingFaceProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Override the endpoint, e.g. to pin a different model.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Prompt text for the `index`-th image of a batch. The seed suffix
    /// keeps repeat calls from collapsing to identical outputs.
    fn prompt_for(request: &ImageRequest, index: u32, fallback_seed: i64) -> String {
        let seed = request.seed.unwrap_or(fallback_seed + index as i64);
        format!(
            "{} [seed:{seed}]",
            styled_prompt(request.style, &request.prompt)
        )
    }

    async fn generate_one(
        &self,
        request: &ImageRequest,
        index: u32,
        fallback_seed: i64,
    ) -> Result<Vec<u8>, ProviderError> {
        let body = serde_json::json!({
            "inputs": Self::prompt_for(request, index, fallback_seed),
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request {
                provider: PROVIDER_NAME,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ProviderError::Upstream {
                provider: PROVIDER_NAME,
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| ProviderError::Request {
            provider: PROVIDER_NAME,
            message: format!("reading image body: {e}"),
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl ImageProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<Vec<u8>>, ProviderError> {
        let fallback_seed = rand::rng().random_range(0..RANDOM_SEED_RANGE);
        let mut buffers = Vec::with_capacity(request.count as usize);
        for index in 0..request.count {
            tracing::debug!(index, count = request.count, "Requesting HuggingFace image");
            buffers.push(self.generate_one(request, index, fallback_seed).await?);
        }
        Ok(buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionforge_core::style::StylePreset;

    fn request(seed: Option<i64>) -> ImageRequest {
        ImageRequest {
            prompt: "a red fox in snow".to_string(),
            negative_prompt: None,
            style: StylePreset::PixelArt,
            width: 1024,
            height: 1024,
            count: 2,
            creativity_level: 50,
            seed,
        }
    }

    #[test]
    fn explicit_seed_is_appended_verbatim() {
        let text = HuggingFaceProvider::prompt_for(&request(Some(7)), 1, 999);
        assert_eq!(
            text,
            "Pixel art style, retro gaming, a red fox in snow [seed:7]"
        );
    }

    #[test]
    fn fallback_seed_varies_per_index() {
        let first = HuggingFaceProvider::prompt_for(&request(None), 0, 100);
        let second = HuggingFaceProvider::prompt_for(&request(None), 1, 100);
        assert!(first.ends_with("[seed:100]"));
        assert!(second.ends_with("[seed:101]"));
    }
}
