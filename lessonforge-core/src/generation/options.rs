//! Per-call generation options and their resolution against configuration

use crate::config::{ConfigError, GenerationConfig, SecretString};
use crate::http::RequestOptions;
use crate::providers::{ProviderKind, SendOptions};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Instruction appended to the system prompt for JSON generation
pub const JSON_INSTRUCTION: &str = "Respond with a single valid JSON document only. \
Do not wrap it in markdown code fences and do not add any commentary.";

/// Options supplied by the caller for one generation call
///
/// Every field is optional; `None` means the caller did not set it and the
/// configured or provider default applies.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub auth_token: Option<SecretString>,
    pub system_prompt: Option<String>,
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<SecretString>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// A generation request with every value decided
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout: Duration,
}

impl ResolvedRequest {
    /// Adapter options for one attempt
    pub fn send_options(&self, json_mode: bool, cancellation: Option<&CancellationToken>) -> SendOptions {
        let system_prompt = if json_mode {
            Some(match &self.system_prompt {
                Some(system) => format!("{}\n\n{}", system, JSON_INSTRUCTION),
                None => JSON_INSTRUCTION.to_string(),
            })
        } else {
            self.system_prompt.clone()
        };

        let mut request = RequestOptions::new().with_timeout(self.timeout);
        if let Some(token) = cancellation {
            request = request.with_cancellation(token.clone());
        }

        SendOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key: self.api_key.clone(),
            system_prompt,
            json_mode,
            request,
        }
    }
}

/// Merge caller options with configuration
///
/// The model is decided from the caller's own `Option` first, so a caller
/// that names no model always gets the default of the provider actually
/// selected rather than a default filled in for some other provider.
pub fn resolve(config: &GenerationConfig, options: &GenerationOptions) -> Result<ResolvedRequest, ConfigError> {
    let provider = options.provider.unwrap_or(config.defaults.provider);
    let settings = config.provider(provider);

    let model = match &options.model {
        Some(model) if model.trim().is_empty() => {
            return Err(ConfigError::invalid_option("model", "must not be empty"));
        }
        Some(model) => model.clone(),
        None => settings
            .and_then(|s| s.default_model.clone())
            .unwrap_or_else(|| provider.default_model().to_string()),
    };

    let temperature = options.temperature.unwrap_or(config.defaults.temperature);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::invalid_option(
            "temperature",
            format!("{} is outside [0, 2]", temperature),
        ));
    }

    let max_tokens = options.max_tokens.unwrap_or(config.defaults.max_tokens);
    if max_tokens == 0 {
        return Err(ConfigError::invalid_option("max_tokens", "must be positive"));
    }

    let timeout = options.timeout.unwrap_or_else(|| config.timeout());
    if timeout.is_zero() {
        return Err(ConfigError::invalid_option("timeout", "must be positive"));
    }

    let api_key = options
        .auth_token
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| settings.and_then(|s| s.api_key.clone()).filter(|key| !key.is_empty()));

    if api_key.is_none() && provider.requires_api_key() {
        return Err(ConfigError::MissingApiKey {
            provider: provider.to_string(),
            env_var: provider.api_key_env_var().to_string(),
        });
    }

    Ok(ResolvedRequest {
        provider,
        model,
        temperature,
        max_tokens,
        api_key,
        base_url: settings.and_then(|s| s.base_url.clone()),
        system_prompt: options
            .system_prompt
            .clone()
            .or_else(|| config.defaults.system_prompt.clone()),
        timeout,
    })
}
