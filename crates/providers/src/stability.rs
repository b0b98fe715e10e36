//! Stability AI image provider.
//!
//! The only backend with a native batch parameter (`samples`), negative
//! prompt weighting, and an explicit seed passthrough.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use visionforge_core::style::styled_prompt;

use crate::{ImageProvider, ImageRequest, ProviderError};

const PROVIDER_NAME: &str = "Stability";
const DEFAULT_API_URL: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image";
const STEPS: u32 = 30;

/// Stability SDXL backed [`ImageProvider`].
pub struct StabilityProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: String,
}

impl StabilityProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Override the endpoint, for compatible self-hosted servers.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Map creativity 0-100 onto the guidance scale 5-20.
    fn cfg_scale(creativity_level: i32) -> i32 {
        ((creativity_level as f64 / 100.0) * 15.0 + 5.0).round() as i32
    }

    /// Full batch request body.
    fn request_body(request: &ImageRequest) -> serde_json::Value {
        let mut text_prompts = vec![serde_json::json!({
            "text": styled_prompt(request.style, &request.prompt),
            "weight": 1,
        })];
        if let Some(negative) = &request.negative_prompt {
            text_prompts.push(serde_json::json!({ "text": negative, "weight": -1 }));
        }

        let mut body = serde_json::json!({
            "text_prompts": text_prompts,
            "cfg_scale": Self::cfg_scale(request.creativity_level),
            "width": request.width,
            "height": request.height,
            "samples": request.count,
            "steps": STEPS,
        });
        if let Some(seed) = request.seed {
            body["seed"] = serde_json::json!(seed);
        }
        body
    }

    /// Decode the batch response, requiring exactly `expected` artifacts.
    /// Content filters can silently shorten a batch; a short one here
    /// would otherwise surface as a job with missing images.
    fn decode_artifacts(
        response: GenerationResponse,
        expected: u32,
    ) -> Result<Vec<Vec<u8>>, ProviderError> {
        if response.artifacts.len() != expected as usize {
            return Err(ProviderError::Request {
                provider: PROVIDER_NAME,
                message: format!(
                    "expected {expected} artifacts, got {}",
                    response.artifacts.len()
                ),
            });
        }
        response
            .artifacts
            .into_iter()
            .map(|artifact| {
                BASE64
                    .decode(artifact.base64)
                    .map_err(|e| ProviderError::Request {
                        provider: PROVIDER_NAME,
                        message: format!("invalid base64 artifact: {e}"),
                    })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ImageProvider for StabilityProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, request: &ImageRequest) -> Result<Vec<Vec<u8>>, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&Self::request_body(request))
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

        let body: GenerationResponse =
            response.json().await.map_err(|e| ProviderError::Request {
                provider: PROVIDER_NAME,
                message: format!("invalid response body: {e}"),
            })?;

        Self::decode_artifacts(body, request.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionforge_core::style::StylePreset;

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "a red fox in snow".to_string(),
            negative_prompt: Some("blurry".to_string()),
            style: StylePreset::Cinematic,
            width: 1024,
            height: 1024,
            count: 3,
            creativity_level: 70,
            seed: Some(1234),
        }
    }

    #[test]
    fn cfg_scale_maps_linearly() {
        assert_eq!(StabilityProvider::cfg_scale(0), 5);
        assert_eq!(StabilityProvider::cfg_scale(50), 13); // 12.5 rounds up
        assert_eq!(StabilityProvider::cfg_scale(70), 16); // 15.5 rounds up
        assert_eq!(StabilityProvider::cfg_scale(100), 20);
    }

    #[test]
    fn body_carries_batch_seed_and_negative_weight() {
        let body = StabilityProvider::request_body(&request());
        assert_eq!(body["samples"], 3);
        assert_eq!(body["seed"], 1234);
        assert_eq!(body["steps"], 30);
        let prompts = body["text_prompts"].as_array().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(
            prompts[0]["text"],
            "Cinematic shot, dramatic lighting, film grain, a red fox in snow"
        );
        assert_eq!(prompts[1]["text"], "blurry");
        assert_eq!(prompts[1]["weight"], -1);
    }

    #[test]
    fn full_batch_decodes_in_order() {
        let body = GenerationResponse {
            artifacts: vec![
                Artifact {
                    base64: BASE64.encode([1u8]),
                },
                Artifact {
                    base64: BASE64.encode([2u8]),
                },
            ],
        };
        let buffers = StabilityProvider::decode_artifacts(body, 2).unwrap();
        assert_eq!(buffers, vec![vec![1u8], vec![2u8]]);
    }

    #[test]
    fn short_batch_is_rejected() {
        let body = GenerationResponse {
            artifacts: vec![Artifact {
                base64: BASE64.encode([1u8]),
            }],
        };
        let err = StabilityProvider::decode_artifacts(body, 3).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Request {
                provider: "Stability",
                ..
            }
        ));
    }

    #[test]
    fn body_omits_seed_when_unset() {
        let mut req = request();
        req.seed = None;
        req.negative_prompt = None;
        let body = StabilityProvider::request_body(&req);
        assert!(body.get("seed").is_none());
        assert_eq!(body["text_prompts"].as_array().unwrap().len(), 1);
    }
}
