//! Provider adapter trait
//!
//! Defines the one capability every vendor implements: turn a prompt plus
//! options into plain text.

use crate::config::SecretString;
use crate::http::RequestOptions;
use crate::providers::{ProviderKind, ProviderResult};
use async_trait::async_trait;

/// Vendor-neutral options for a single completion call
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Model (or Azure deployment) name
    pub model: String,

    /// Sampling temperature in `[0, 2]`
    pub temperature: f32,

    /// Maximum completion tokens
    pub max_tokens: u32,

    /// Credential, if the provider needs one
    pub api_key: Option<SecretString>,

    /// Optional system prompt
    pub system_prompt: Option<String>,

    /// Ask the vendor for JSON output where it supports a flag for it
    pub json_mode: bool,

    /// Transport options (request id, timeout, cancellation)
    pub request: RequestOptions,
}

impl SendOptions {
    /// Options for `model` with everything else at conservative defaults
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: None,
            system_prompt: None,
            json_mode: false,
            request: RequestOptions::default(),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Enable JSON mode
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Replace the transport options
    pub fn with_request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }

    /// The API key as a plain string, empty when absent
    pub(crate) fn key(&self) -> &str {
        self.api_key.as_ref().map(|k| k.expose_secret()).unwrap_or("")
    }
}

/// Core adapter trait that all LLM providers implement
///
/// Implementations keep no per-call state, so one instance can serve any
/// number of concurrent calls.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which vendor this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// The base URL requests are sent to
    fn base_url(&self) -> &str;

    /// Send `prompt` and return the completion text
    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String>;
}

/// Trim a trailing slash so endpoint paths can be appended uniformly
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_options_builder() {
        let options = SendOptions::new("gpt-4o-mini")
            .with_api_key("sk-test")
            .with_system_prompt("be brief")
            .with_json_mode(true);

        assert_eq!(options.model, "gpt-4o-mini");
        assert_eq!(options.key(), "sk-test");
        assert!(options.json_mode);
        assert_eq!(SendOptions::new("m").key(), "");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.openai.com/v1/"), "https://api.openai.com/v1");
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
    }
}
