//! HTTP error mapping utilities

use crate::providers::ProviderError;
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

/// Map an HTTP status code and response body to a ProviderError
///
/// The vendor's own message is preferred over the raw body so that the
/// admin UI shows something readable.
pub fn map_http_error(status: StatusCode, body: Option<String>, request_id: Uuid) -> ProviderError {
    let error_message = body
        .as_ref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_message(&v))
        .or_else(|| body.filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()))
        });

    ProviderError::http(
        status.as_u16(),
        format!("{} [request_id: {}]", error_message, request_id),
    )
}

/// Extract an error message from the common vendor error envelopes
fn extract_error_message(json: &Value) -> Option<String> {
    // OpenAI / Azure / Anthropic: { "error": { "message": "..." } }
    // Google: { "error": { "code": 400, "message": "...", "status": "..." } }
    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
    {
        return Some(message.to_string());
    }

    // HuggingFace: { "error": "Model is currently loading" }
    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Some(error.to_string());
    }

    // Generic: { "message": "..." } or { "detail": "..." }
    ["message", "detail"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
