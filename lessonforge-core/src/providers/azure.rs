//! Azure OpenAI provider implementation
//!
//! Azure routes by deployment name in the path, so the chat body is sent
//! without a `model` field.

use super::openai::converter::{from_openai_response, to_body, to_openai_request};
use crate::http::{HttpClient, JsonRequest};
use crate::providers::adapter::normalize_base_url;
use crate::providers::{ProviderAdapter, ProviderKind, ProviderResult, SendOptions};
use async_trait::async_trait;
use tracing::debug;

/// Azure OpenAI REST API version
pub const AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Azure OpenAI adapter; `options.model` names the deployment
pub struct AzureOpenAIAdapter {
    base_url: String,
    http: HttpClient,
}

impl AzureOpenAIAdapter {
    pub fn new(base_url: &str, http: HttpClient) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            http,
        }
    }

    fn endpoint(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.base_url, deployment, AZURE_API_VERSION
        )
    }
}

#[async_trait]
impl ProviderAdapter for AzureOpenAIAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, prompt: &str, options: &SendOptions) -> ProviderResult<String> {
        let body = to_body(&to_openai_request(prompt, options, false))?;
        debug!(deployment = %options.model, "sending Azure OpenAI chat completion");

        let request = JsonRequest::new(self.endpoint(&options.model), body).header("api-key", options.key());

        let response = self.http.post_json("azure", request, &options.request).await?;
        from_openai_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_deployment() {
        let adapter = AzureOpenAIAdapter::new("https://res.openai.azure.com/", HttpClient::new().unwrap());
        assert_eq!(
            adapter.endpoint("gpt4o-prod"),
            "https://res.openai.azure.com/openai/deployments/gpt4o-prod/chat/completions?api-version=2024-02-15-preview"
        );
    }
}
