//! Prompt enhancement with an optional AI backend.
//!
//! When an OpenAI key is configured the enhancer asks a chat model for an
//! enriched prompt, three variations, and tags. Any backend problem at
//! all, from a network error to malformed JSON in the reply, falls back
//! to the deterministic rule-based path, so `enhance` itself never fails.

use serde::Deserialize;
use visionforge_core::enhance::{rule_based_enhance, EnhancedPrompt};
use visionforge_core::style::StylePreset;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.8;
const MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str = "You are an expert prompt engineer for text-to-image models. \
     Given a user prompt and optional art style, reply with JSON only: \
     {\"enhanced\": string, \"variations\": [string, string, string], \"tags\": [string]}. \
     The enhanced prompt adds concrete visual detail without changing the subject.";

/// Enhances prompts via a chat model when configured, with a
/// deterministic fallback.
pub struct PromptEnhancer {
    backend: Option<ChatBackend>,
}

struct ChatBackend {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// The JSON shape the model is instructed to return.
#[derive(Debug, Deserialize)]
struct EnhancementReply {
    enhanced: String,
    #[serde(default)]
    variations: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl PromptEnhancer {
    /// Rule-based only, no backend.
    pub fn rule_based() -> Self {
        Self { backend: None }
    }

    /// AI-backed enhancer using the given client and key.
    pub fn with_openai(client: reqwest::Client, api_key: String) -> Self {
        Self {
            backend: Some(ChatBackend {
                client,
                api_key,
                api_url: DEFAULT_API_URL.to_string(),
            }),
        }
    }

    /// Build from the environment: AI-backed when `OPENAI_API_KEY` is
    /// set, rule-based otherwise.
    pub fn from_env(client: reqwest::Client) -> Self {
        match std::env::var("OPENAI_API_KEY") {
            Ok(api_key) if !api_key.is_empty() => Self::with_openai(client, api_key),
            _ => {
                tracing::info!("No OpenAI key set; prompt enhancement is rule-based");
                Self::rule_based()
            }
        }
    }

    /// Enhance a prompt. Infallible: backend problems degrade to the
    /// rule-based result.
    pub async fn enhance(&self, prompt: &str, style: Option<StylePreset>) -> EnhancedPrompt {
        let Some(backend) = &self.backend else {
            return rule_based_enhance(prompt, style);
        };
        match backend.enhance(prompt, style).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "AI enhancement failed, using rule-based fallback");
                rule_based_enhance(prompt, style)
            }
        }
    }
}

impl ChatBackend {
    async fn enhance(
        &self,
        prompt: &str,
        style: Option<StylePreset>,
    ) -> Result<EnhancedPrompt, String> {
        let user_content = match style {
            Some(style) => format!("Prompt: {prompt}\nStyle: {}", style.slug()),
            None => format!("Prompt: {prompt}"),
        };
        let body = serde_json::json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_content},
            ],
            "response_format": {"type": "json_object"},
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("chat completion returned {status}"));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| e.to_string())?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| "reply contained no choices".to_string())?;

        let parsed: EnhancementReply =
            serde_json::from_str(&content).map_err(|e| format!("unparseable reply: {e}"))?;
        if parsed.enhanced.trim().is_empty() {
            return Err("reply had an empty enhanced prompt".to_string());
        }

        Ok(EnhancedPrompt {
            original: prompt.to_string(),
            enhanced: parsed.enhanced,
            variations: parsed.variations,
            tags: parsed.tags,
        })
    }
}
