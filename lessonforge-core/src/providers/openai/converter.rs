//! Conversion between vendor-neutral send options and the OpenAI chat format

use super::types::*;
use crate::providers::{ProviderError, ProviderResult, SendOptions};
use serde_json::Value;
use tracing::{debug, warn};

/// Build a chat request for `prompt`
///
/// `include_model` is false for Azure, which routes by deployment name.
pub fn to_openai_request(prompt: &str, options: &SendOptions, include_model: bool) -> OpenAIRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &options.system_prompt {
        messages.push(OpenAIMessage::system(system.clone()));
    }
    messages.push(OpenAIMessage::user(prompt));

    OpenAIRequest {
        model: include_model.then(|| options.model.clone()),
        messages,
        temperature: Some(options.temperature),
        max_tokens: Some(options.max_tokens),
        stream: Some(false),
        response_format: options.json_mode.then(OpenAIResponseFormat::json_object),
    }
}

/// Serialize a chat request into a JSON body
pub fn to_body(request: &OpenAIRequest) -> ProviderResult<Value> {
    serde_json::to_value(request)
        .map_err(|e| ProviderError::invalid_response(format!("Failed to serialize request: {}", e)))
}

/// Extract the completion text from a chat response
pub fn from_openai_response(value: Value) -> ProviderResult<String> {
    let response: OpenAIResponse = serde_json::from_value(value)
        .map_err(|e| ProviderError::invalid_response(format!("Unexpected response shape: {}", e)))?;

    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "token usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::invalid_response("Response contained no choices"))?;

    if choice.finish_reason.as_deref() == Some("length") {
        warn!("completion stopped at the token limit; output may be truncated");
    }

    choice
        .message
        .and_then(|m| m.content)
        .or(choice.text)
        .ok_or_else(|| ProviderError::invalid_response("Response choice had no text content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_system_and_json_mode() {
        let options = SendOptions::new("gpt-4o-mini")
            .with_system_prompt("Respond with JSON")
            .with_json_mode(true);
        let body = to_body(&to_openai_request("hi", &options, true)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_without_model() {
        let body = to_body(&to_openai_request("hi", &SendOptions::new("deploy"), false)).unwrap();
        assert!(body.get("model").is_none());
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_content() {
        let value = json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        });
        assert_eq!(from_openai_response(value).unwrap(), "hello");
    }

    #[test]
    fn test_extract_missing_choices() {
        let err = from_openai_response(json!({"choices": []})).unwrap_err();
        assert_eq!(err.kind, crate::providers::ProviderErrorKind::InvalidResponse);
    }
}
