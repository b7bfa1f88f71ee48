//! HuggingFace Inference API provider implementation

use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderError, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// HuggingFace text-generation adapter
///
/// The inference API has no system role, so a system prompt is prepended
/// to the input text.
pub struct HuggingFaceAdapter {
    base_url: String,
    http: HttpClient,
}

impl HuggingFaceAdapter {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    fn build_body(prompt: &str, options: &SendOptions) -> Value {
        let inputs = match &options.system_prompt {
            Some(system) => format!("{}\n\n{}", system, prompt),
            None => prompt.to_string(),
        };

        json!({
            "inputs": inputs,
            "parameters": {
                "temperature": options.temperature,
                "max_new_tokens": options.max_tokens,
                "return_full_text": false
            }
        })
    }

    /// Text lives at `[0].generated_text` or, for some models, at the top level
    fn extract_text(value: &Value) -> ProviderResult<String> {
        value
            .get(0)
            .and_then(|first| first.get("generated_text"))
            .or_else(|| value.get("generated_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::invalid_response("Response had no generated_text"))
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        debug!(model = %options.model, "sending HuggingFace inference request");

        let request = JsonRequest::new(
            format!("{}/models/{}", self.base_url, options.model),
            Self::build_body(prompt, options),
        )
        .header("Authorization", format!("Bearer {}", options.key()));

        let response = self.http.post_json("huggingface", request, &options.request).await?;
        Self::extract_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_prepends_system_prompt() {
        let options = SendOptions::new("m").with_system_prompt("sys");
        let body = HuggingFaceAdapter::build_body("user text", &options);
        assert_eq!(body["inputs"], "sys\n\nuser text");
        assert_eq!(body["parameters"]["max_new_tokens"], 2000);
        assert_eq!(body["parameters"]["return_full_text"], false);
    }

    #[test]
    fn test_extract_array_and_object_shapes() {
        let array = json!([{"generated_text": "a"}]);
        let object = json!({"generated_text": "b"});
        assert_eq!(HuggingFaceAdapter::extract_text(&array).unwrap(), "a");
        assert_eq!(HuggingFaceAdapter::extract_text(&object).unwrap(), "b");
        assert!(HuggingFaceAdapter::extract_text(&json!([])).is_err());
    }
}
