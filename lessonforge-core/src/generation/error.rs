//! Generation error types

use crate::config::ConfigError;
use crate::providers::{ProviderError, ProviderKind};
use thiserror::Error;

/// Errors surfaced by [`GenerationService`](super::GenerationService)
///
/// Malformed model output is not an error for the JSON operations; it ends
/// in a fallback object instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    #[error("Generation cancelled by caller")]
    Cancelled,
}

impl GenerationError {
    /// Wrap an adapter error; caller cancellation gets its own variant
    pub fn from_provider(provider: ProviderKind, error: ProviderError) -> Self {
        if error.is_cancelled() {
            GenerationError::Cancelled
        } else {
            GenerationError::Provider {
                provider,
                source: error,
            }
        }
    }

    /// Whether the caller could reasonably retry
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Provider { source, .. } => source.is_retryable(),
            GenerationError::Configuration(_) | GenerationError::Cancelled => false,
        }
    }
}
