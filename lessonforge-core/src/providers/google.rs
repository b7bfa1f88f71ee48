//! Google Gemini provider implementation
//!
//! Gemini takes the key as a query parameter and splits the system prompt
//! into `systemInstruction`.

use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderError, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

/// Google Generative Language (Gemini) adapter
pub struct GoogleAdapter {
    base_url: String,
    http: HttpClient,
}

impl GoogleAdapter {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    /// `{base}/models/{model}:generateContent?key={key}` with both parts percent-encoded
    fn endpoint(&self, model: &str, key: &str) -> ProviderResult<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::network(format!("Invalid Gemini base URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::network(format!("Gemini base URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{}:generateContent", model));
        url.query_pairs_mut().append_pair("key", key);
        Ok(url.into())
    }

    fn build_body(prompt: &str, options: &SendOptions) -> ProviderResult<serde_json::Value> {
        let request = GeminiRequest {
            contents: vec![text_content(Some("user"), prompt)],
            system_instruction: options
                .system_prompt
                .as_deref()
                .map(|system| text_content(None, system)),
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
                response_mime_type: options.json_mode.then_some("application/json"),
            },
        };

        serde_json::to_value(&request)
            .map_err(|e| ProviderError::invalid_response(format!("Failed to serialize request: {}", e)))
    }

    fn extract_text(value: serde_json::Value) -> ProviderResult<String> {
        let response: GeminiResponse = serde_json::from_value(value)
            .map_err(|e| ProviderError::invalid_response(format!("Unexpected response shape: {}", e)))?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::invalid_response("Response contained no candidates"))?;

        if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
            warn!("Gemini stopped at the token limit; output may be truncated");
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::invalid_response("Candidate had no text parts"));
        }
        Ok(text)
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        let body = Self::build_body(prompt, options)?;
        debug!(model = %options.model, json_mode = options.json_mode, "sending Gemini generateContent");

        let request = JsonRequest::new(self.endpoint(&options.model, options.key())?, body);
        let response = self.http.post_json("google", request, &options.request).await?;
        Self::extract_text(response)
    }
}
