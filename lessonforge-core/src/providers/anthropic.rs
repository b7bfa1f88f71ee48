//! Anthropic provider implementation
//!
//! Claude takes the system prompt as a top-level field rather than a
//! message, and has no JSON response flag; JSON mode relies on the prompt.

use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderError, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Messages API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API adapter
pub struct AnthropicAdapter {
    base_url: String,
    http: HttpClient,
}

impl AnthropicAdapter {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    fn build_body(prompt: &str, options: &SendOptions) -> ProviderResult<serde_json::Value> {
        let request = AnthropicRequest {
            model: &options.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system: options.system_prompt.as_deref(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        serde_json::to_value(&request)
            .map_err(|e| ProviderError::invalid_response(format!("Failed to serialize request: {}", e)))
    }

    fn extract_text(value: serde_json::Value) -> ProviderResult<String> {
        let response: AnthropicResponse = serde_json::from_value(value)
            .map_err(|e| ProviderError::invalid_response(format!("Unexpected response shape: {}", e)))?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Claude stopped at the token limit; output may be truncated");
        }

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::invalid_response("Response had no text blocks"));
        }
        Ok(text)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        let body = Self::build_body(prompt, options)?;
        debug!(model = %options.model, "sending Anthropic message");

        let request = JsonRequest::new(format!("{}/messages", self.base_url), body)
            .header("x-api-key", options.key())
            .header("anthropic-version", ANTHROPIC_VERSION);

        let response = self.http.post_json("anthropic", request, &options.request).await?;
        Self::extract_text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_prompt_is_top_level() {
        let options = SendOptions::new("claude-3-5-haiku-20241022").with_system_prompt("be terse");
        let body = AnthropicAdapter::build_body("hello", &options).unwrap();

        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_extract_skips_non_text_blocks() {
        let value = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "[1, 2]"}
            ],
            "stop_reason": "end_turn"
        });
        assert_eq!(AnthropicAdapter::extract_text(value).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_extract_empty_content() {
        assert!(AnthropicAdapter::extract_text(json!({"content": []})).is_err());
    }
}
