//! Custom OpenAI-compatible endpoint (Ollama, vLLM, LM Studio and the like)

use super::openai::converter::{to_body, to_openai_request};
use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderError, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Adapter for self-hosted servers that mostly speak the OpenAI chat format
///
/// The bearer header is only sent when a key is configured, and the
/// response is searched in several places since compatible servers differ.
pub struct CustomAdapter {
    base_url: String,
    http: HttpClient,
}

impl CustomAdapter {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    fn extract_text(value: &Value) -> ProviderResult<String> {
        let choice = value.get("choices").and_then(|c| c.get(0));
        let candidates = [
            choice.and_then(|c| c.pointer("/message/content")),
            choice.and_then(|c| c.get("text")),
            value.pointer("/message/content"),
            value.get("response"),
            value.get("generated_text"),
            value.get("output"),
        ];

        candidates
            .into_iter()
            .flatten()
            .find_map(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::invalid_response("No completion text found in response"))
    }
}

#[async_trait]
impl ProviderAdapter for CustomAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        let body = to_body(&to_openai_request(prompt, options, true))?;
        debug!(model = %options.model, base_url = %self.base_url, "sending custom chat completion");

        let mut request = JsonRequest::new(format!("{}/chat/completions", self.base_url), body);
        if !options.key().is_empty() {
            request = request.header("Authorization", format!("Bearer {}", options.key()));
        }

        let response = self.http.post_json("custom", request, &options.request).await?;
        Self::extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_variants() {
        let cases = [
            json!({"choices": [{"message": {"content": "a"}}]}),
            json!({"choices": [{"text": "a"}]}),
            json!({"message": {"role": "assistant", "content": "a"}}),
            json!({"response": "a", "done": true}),
            json!({"generated_text": "a"}),
            json!({"output": "a"}),
        ];
        for case in &cases {
            assert_eq!(CustomAdapter::extract_text(case).unwrap(), "a", "{}", case);
        }
    }

    #[test]
    fn test_extract_nothing() {
        assert!(CustomAdapter::extract_text(&json!({"status": "ok"})).is_err());
    }
}
