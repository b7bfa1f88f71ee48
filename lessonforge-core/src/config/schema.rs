//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use crate::generation::retry::RetryPolicy;
use crate::providers::ProviderKind;
use crate::rollout::RolloutPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Root configuration for the generation core
///
/// Built once per process (from a file, from the environment, or in code)
/// and shared read-only by [`crate::generation::GenerationService`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: String,

    /// Per-provider credentials, endpoints and default models
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,

    /// Defaults applied when the caller leaves an option unset
    #[serde(default)]
    pub defaults: DefaultConfig,

    /// JSON repair and regeneration settings
    #[serde(default)]
    pub repair: RepairConfig,

    /// Global connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Optional cost-tier rollout policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<RolloutPolicy>,
}

/// Settings for one provider
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Which vendor these settings apply to
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    /// API key (supports environment variable interpolation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Base URL override for self-hosted or regional endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model used when the caller does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl ProviderSettings {
    /// Settings with nothing but the provider kind
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
            default_model: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }
}

/// Default request values
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    /// Provider used when the caller does not pick one
    #[serde(default)]
    pub provider: ProviderKind,

    /// Default sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default completion length
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System prompt sent with every request unless overridden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
        }
    }
}

/// JSON repair and regeneration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepairConfig {
    /// Total generation attempts before returning a fallback object
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Characters of raw output kept in fallback previews
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Backoff between regeneration attempts
    #[serde(default)]
    pub backoff: RetryPolicy,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            preview_chars: default_preview_chars(),
            backoff: RetryPolicy::default(),
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            max_idle_per_host: default_max_idle(),
        }
    }
}

// Default value functions for serde
fn default_version() -> String { "0.1".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 2000 }
fn default_timeout_secs() -> u64 { 60 }
fn default_max_attempts() -> u32 { 2 }
fn default_preview_chars() -> usize { 200 }
fn default_connect_timeout() -> u64 { 10000 }
fn default_max_idle() -> usize { 10 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            providers: Vec::new(),
            defaults: DefaultConfig::default(),
            repair: RepairConfig::default(),
            connection: ConnectionConfig::default(),
            rollout: None,
        }
    }
}

impl GenerationConfig {
    /// Settings for a provider, if any were configured
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderSettings> {
        self.providers.iter().find(|p| p.kind == kind)
    }

    /// Add or replace the settings for one provider
    pub fn with_provider(mut self, settings: ProviderSettings) -> Self {
        self.providers.retain(|p| p.kind != settings.kind);
        self.providers.push(settings);
        self
    }

    /// Default per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != "0.1" {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: "0.1".to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if !seen.insert(provider.kind) {
                return Err(ValidationError::new(
                    format!("providers[{}].type", i),
                    ValidationErrorKind::DuplicateValue {
                        value: provider.kind.to_string(),
                    },
                ));
            }
            provider.validate(&format!("providers[{}]", i))?;
        }

        if !(0.0..=2.0).contains(&self.defaults.temperature) {
            return Err(ValidationError::out_of_range(
                "defaults.temperature",
                "Temperature must be between 0.0 and 2.0",
            ));
        }

        if self.defaults.max_tokens == 0 {
            return Err(ValidationError::out_of_range(
                "defaults.max_tokens",
                "Max tokens must be positive",
            ));
        }

        if self.defaults.timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "defaults.timeout_secs",
                "Timeout must be positive",
            ));
        }

        if self.repair.max_attempts == 0 {
            return Err(ValidationError::out_of_range(
                "repair.max_attempts",
                "At least one attempt is required",
            ));
        }

        Ok(())
    }
}

impl ProviderSettings {
    /// Validate provider settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) => {
                    if url.scheme() != "http" && url.scheme() != "https" {
                        return Err(ValidationError::new(
                            format!("{}.base_url", path),
                            ValidationErrorKind::InvalidUrl {
                                message: format!(
                                    "URL scheme must be http or https, got: {}",
                                    url.scheme()
                                ),
                            },
                        ));
                    }
                }
                Err(e) => {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            message: e.to_string(),
                        },
                    ));
                }
            }
        }

        if let Some(model) = &self.default_model {
            if model.trim().is_empty() {
                return Err(ValidationError::required(format!("{}.default_model", path))
                    .with_context("Omit the field instead of leaving it empty"));
            }
        }

        Ok(())
    }
}
