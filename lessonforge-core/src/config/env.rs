//! Environment variable handling for configuration
//!
//! Two concerns live here: `${VAR}` interpolation inside config files, and
//! building a [`GenerationConfig`] straight from the per-provider variables
//! (`OPENAI_API_KEY`, `GOOGLE_BASE_URL`, ...). Missing keys are not an error
//! at this point; they are reported when a request selects that provider.

use super::error::ConfigError;
use super::schema::{GenerationConfig, ProviderSettings};
use super::secrets::SecretString;
use crate::providers::ProviderKind;
use regex::Regex;
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                missing_vars.push(var_name.to_string());
            }
        }
    }

    if let Some(var) = missing_vars.first() {
        return Err(ConfigError::EnvVarNotFound { var: var.clone() });
    }

    Ok(result)
}

/// Interpolate any placeholders that survived parsing (e.g. from JSON escapes)
pub fn interpolate_config_env_vars(config: &mut GenerationConfig) -> Result<(), ConfigError> {
    for provider in &mut config.providers {
        if let Some(api_key) = &provider.api_key {
            if ENV_VAR_PATTERN.is_match(api_key.expose_secret()) {
                let interpolated = interpolate_env_vars(api_key.expose_secret())?;
                provider.api_key = Some(SecretString::new(interpolated));
            }
        }

        if let Some(base_url) = &provider.base_url {
            if ENV_VAR_PATTERN.is_match(base_url) {
                provider.base_url = Some(interpolate_env_vars(base_url)?);
            }
        }
    }

    Ok(())
}

/// Read a variable, treating empty values as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GenerationConfig {
    /// Build a configuration from process environment variables
    ///
    /// Every provider gets an entry when either its key or its base URL
    /// variable is set. `LLM_DEFAULT_PROVIDER` selects the default provider.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = GenerationConfig::default();

        for kind in ProviderKind::ALL {
            let api_key = non_empty_var(kind.api_key_env_var());
            let base_url = non_empty_var(kind.base_url_env_var());
            if api_key.is_none() && base_url.is_none() {
                continue;
            }

            let mut settings = ProviderSettings::new(kind);
            settings.api_key = api_key.map(SecretString::new);
            settings.base_url = base_url;
            config.providers.push(settings);
        }

        if let Some(name) = non_empty_var("LLM_DEFAULT_PROVIDER") {
            config.defaults.provider = name.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}
