//! Adapter construction by provider kind or name

use crate::config::ConfigError;
use crate::http::HttpClient;
use crate::providers::{
    AnthropicAdapter, AzureOpenAIAdapter, CustomAdapter, GoogleAdapter, HuggingFaceAdapter,
    OpenAIAdapter, ProviderAdapter, ProviderKind,
};
use tracing::debug;
use url::Url;

/// Builds adapters that share one pooled HTTP client
#[derive(Clone)]
pub struct AdapterFactory {
    http: HttpClient,
}

impl AdapterFactory {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Create the adapter for `kind`
    ///
    /// `base_url_override` replaces the vendor's public endpoint; Azure and
    /// Custom have none and require it.
    pub fn create(
        &self,
        kind: ProviderKind,
        base_url_override: Option<&str>,
    ) -> Result<Box<dyn ProviderAdapter>, ConfigError> {
        let base_url = match base_url_override {
            Some(url) => {
                validate_base_url(url)?;
                url
            }
            None => kind.default_base_url().ok_or_else(|| ConfigError::MissingBaseUrl {
                provider: kind.to_string(),
            })?,
        };

        debug!(provider = %kind, base_url, "creating provider adapter");

        let http = self.http.clone();
        let adapter: Box<dyn ProviderAdapter> = match kind {
            ProviderKind::OpenAI => Box::new(OpenAIAdapter::new(base_url, http)),
            ProviderKind::Google => Box::new(GoogleAdapter::new(base_url, http)),
            ProviderKind::Anthropic => Box::new(AnthropicAdapter::new(base_url, http)),
            ProviderKind::HuggingFace => Box::new(HuggingFaceAdapter::new(base_url, http)),
            ProviderKind::Azure => Box::new(AzureOpenAIAdapter::new(base_url, http)),
            ProviderKind::Custom => Box::new(CustomAdapter::new(base_url, http)),
        };
        Ok(adapter)
    }

    /// Create an adapter from a provider name such as `"gemini"` or `"hf"`
    pub fn create_by_name(
        &self,
        name: &str,
        base_url_override: Option<&str>,
    ) -> Result<Box<dyn ProviderAdapter>, ConfigError> {
        self.create(name.parse()?, base_url_override)
    }
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}
