//! Configuration validation utilities

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::GenerationConfig;
use crate::providers::ProviderKind;
use tracing::warn;

/// Configuration validator with rules that span several sections
pub struct ConfigValidator;

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &GenerationConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_endpoints(config)?;
        self.validate_backoff(config)?;
        self.validate_rollout(config)?;
        self.warn_on_plain_keys(config);

        Ok(())
    }

    /// Azure and Custom have no public endpoint to fall back on
    fn validate_endpoints(&self, config: &GenerationConfig) -> Result<(), ValidationError> {
        for (i, provider) in config.providers.iter().enumerate() {
            if provider.kind.default_base_url().is_none() && provider.base_url.is_none() {
                return Err(ValidationError::required(format!("providers[{}].base_url", i))
                    .with_context(format!("{} has no default endpoint", provider.kind)));
            }
        }

        if config.defaults.provider.default_base_url().is_none()
            && config.provider(config.defaults.provider).is_none()
        {
            return Err(ValidationError::new(
                "defaults.provider",
                ValidationErrorKind::InvalidValue {
                    expected: "a provider with a configured endpoint".to_string(),
                    actual: config.defaults.provider.to_string(),
                },
            ));
        }

        Ok(())
    }

    fn validate_backoff(&self, config: &GenerationConfig) -> Result<(), ValidationError> {
        let backoff = &config.repair.backoff;

        if !(0.0..=1.0).contains(&backoff.jitter_factor) {
            return Err(ValidationError::out_of_range(
                "repair.backoff.jitter_factor",
                "Jitter factor must be between 0.0 and 1.0",
            ));
        }

        if backoff.exponential_base < 1.0 {
            return Err(ValidationError::out_of_range(
                "repair.backoff.exponential_base",
                "Exponential base must be at least 1.0",
            ));
        }

        if backoff.initial_delay_ms > backoff.max_delay_ms {
            return Err(ValidationError::out_of_range(
                "repair.backoff.initial_delay_ms",
                "Initial delay cannot exceed max delay",
            ));
        }

        Ok(())
    }

    fn validate_rollout(&self, config: &GenerationConfig) -> Result<(), ValidationError> {
        let Some(policy) = &config.rollout else {
            return Ok(());
        };

        if policy.window.trim().is_empty() {
            return Err(ValidationError::required("rollout.window"));
        }

        let mut seen = std::collections::HashSet::new();
        for (i, bucket) in policy.buckets.iter().enumerate() {
            if !seen.insert(bucket.tier) {
                return Err(ValidationError::new(
                    format!("rollout.buckets[{}].tier", i),
                    ValidationErrorKind::DuplicateValue {
                        value: bucket.tier.to_string(),
                    },
                ));
            }
        }

        if !policy.buckets.is_empty() && policy.total_weight() == 0 {
            return Err(ValidationError::out_of_range(
                "rollout.buckets",
                "Sum of bucket weights must be positive",
            ));
        }

        Ok(())
    }

    /// Keys written literally into a file are allowed but worth a warning
    fn warn_on_plain_keys(&self, config: &GenerationConfig) {
        for provider in &config.providers {
            if let Some(key) = &provider.api_key {
                if key.is_empty() && provider.kind != ProviderKind::Custom {
                    warn!(provider = %provider.kind, "empty API key in configuration");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::cost::CostTier;
    use crate::rollout::{RolloutPolicy, TierWeight};

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::new().validate(&GenerationConfig::default()).is_ok());
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let config = GenerationConfig::default()
            .with_provider(ProviderSettings::new(ProviderKind::Azure).with_api_key("k"));
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "providers[0].base_url");
    }

    #[test]
    fn test_default_custom_provider_needs_settings() {
        let mut config = GenerationConfig::default();
        config.defaults.provider = ProviderKind::Custom;
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "defaults.provider");
    }

    #[test]
    fn test_rollout_duplicate_tier() {
        let mut config = GenerationConfig::default();
        config.rollout = Some(RolloutPolicy {
            window: "2024-q3".to_string(),
            default_tier: CostTier::Minimal,
            buckets: vec![
                TierWeight { tier: CostTier::Minimal, weight: 50 },
                TierWeight { tier: CostTier::Minimal, weight: 50 },
            ],
        });
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "rollout.buckets[1].tier");
    }

    #[test]
    fn test_rollout_zero_weight() {
        let mut config = GenerationConfig::default();
        config.rollout = Some(RolloutPolicy {
            window: "w".to_string(),
            default_tier: CostTier::Minimal,
            buckets: vec![TierWeight { tier: CostTier::Premium, weight: 0 }],
        });
        assert!(ConfigValidator::new().validate(&config).is_err());
    }
}
