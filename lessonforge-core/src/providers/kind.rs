//! The closed set of supported LLM vendors

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported provider kinds
///
/// Adding a vendor means adding a variant here plus one adapter module;
/// calling code only ever sees [`crate::providers::ProviderAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Google,
    Anthropic,
    HuggingFace,
    Azure,
    Custom,
}

impl ProviderKind {
    /// All provider kinds, in declaration order
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAI,
        ProviderKind::Google,
        ProviderKind::Anthropic,
        ProviderKind::HuggingFace,
        ProviderKind::Azure,
        ProviderKind::Custom,
    ];

    /// Stable lowercase name used in logs, config files and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Azure => "azure",
            ProviderKind::Custom => "custom",
        }
    }

    /// The vendor's documented default model
    ///
    /// For Azure this is the deployment name the service assumes when none
    /// is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Google => "gemini-1.5-flash",
            ProviderKind::Anthropic => "claude-3-5-haiku-20241022",
            ProviderKind::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
            ProviderKind::Azure => "gpt-4o",
            ProviderKind::Custom => "gemma3:4b",
        }
    }

    /// Public endpoint, if the vendor has one
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAI => Some("https://api.openai.com/v1"),
            ProviderKind::Google => Some("https://generativelanguage.googleapis.com/v1beta"),
            ProviderKind::Anthropic => Some("https://api.anthropic.com/v1"),
            ProviderKind::HuggingFace => Some("https://api-inference.huggingface.co"),
            ProviderKind::Azure | ProviderKind::Custom => None,
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Google => "GOOGLE_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::HuggingFace => "HUGGINGFACE_API_KEY",
            ProviderKind::Azure => "AZURE_OPENAI_API_KEY",
            ProviderKind::Custom => "CUSTOM_LLM_API_KEY",
        }
    }

    /// Environment variable holding a base URL override
    pub fn base_url_env_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_BASE_URL",
            ProviderKind::Google => "GOOGLE_BASE_URL",
            ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
            ProviderKind::HuggingFace => "HUGGINGFACE_BASE_URL",
            ProviderKind::Azure => "AZURE_OPENAI_ENDPOINT",
            ProviderKind::Custom => "CUSTOM_LLM_BASE_URL",
        }
    }

    /// Self-hosted custom endpoints (Ollama, vLLM) usually run without auth
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Custom)
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenAI
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "google" | "gemini" => Ok(ProviderKind::Google),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "azure" | "azure-openai" => Ok(ProviderKind::Azure),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(ConfigError::UnknownProvider {
                name: s.to_string(),
            }),
        }
    }
}
