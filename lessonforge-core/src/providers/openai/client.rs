//! OpenAI client implementation

use super::converter::{from_openai_response, to_body, to_openai_request};
use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use tracing::debug;

/// OpenAI chat completions adapter
pub struct OpenAIAdapter {
    base_url: String,
    http: HttpClient,
}

impl OpenAIAdapter {
    /// Create an adapter posting to `{base_url}/chat/completions`
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        let body = to_body(&to_openai_request(prompt, options, true))?;
        debug!(model = %options.model, json_mode = options.json_mode, "sending OpenAI chat completion");

        let request = JsonRequest::new(self.endpoint(), body)
            .header("Authorization", format!("Bearer {}", options.key()));

        let response = self.http.post_json("openai", request, &options.request).await?;
        from_openai_response(response)
    }
}
