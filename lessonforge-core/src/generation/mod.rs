//! Vendor-neutral generation facade
//!
//! [`GenerationService`] resolves per-call options against an immutable
//! [`GenerationConfig`], picks the adapter for the selected provider and
//! returns either plain text or repaired JSON. JSON calls never fail on
//! malformed model output; after the configured number of attempts they
//! return a [`GenerationFallback`] instead.

pub mod error;
pub mod options;
pub mod retry;

pub use error::GenerationError;
pub use options::{resolve, GenerationOptions, ResolvedRequest, JSON_INSTRUCTION};
pub use retry::RetryPolicy;

use crate::config::{ConfigError, GenerationConfig};
use crate::http::HttpClient;
use crate::providers::{AdapterFactory, ProviderAdapter, ProviderKind};
use crate::repair::{preview, JsonRepairPipeline, RepairStage, FALLBACK_ERROR};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Title carried by every fallback object
pub const FALLBACK_TITLE: &str = "Generation Error";

/// Object returned in place of content when the model output could not be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFallback {
    pub title: String,
    pub error: String,
    pub raw_preview: String,
}

impl GenerationFallback {
    pub fn new(error: impl Into<String>, raw_preview: impl Into<String>) -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            error: error.into(),
            raw_preview: raw_preview.into(),
        }
    }

    /// The fallback as a JSON object
    pub fn to_value(&self) -> Value {
        json!({
            "title": self.title,
            "error": self.error,
            "rawPreview": self.raw_preview,
        })
    }
}

/// Outcome of a JSON generation call
#[derive(Debug, Clone, PartialEq)]
pub enum JsonGeneration<T> {
    /// Output parsed into `T`, possibly after repair
    Parsed { value: T, stage: RepairStage },
    /// Every attempt failed to produce a usable document
    Fallback(GenerationFallback),
}

impl<T> JsonGeneration<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, JsonGeneration::Fallback(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            JsonGeneration::Parsed { value, .. } => Some(value),
            JsonGeneration::Fallback(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            JsonGeneration::Parsed { value, .. } => Some(value),
            JsonGeneration::Fallback(_) => None,
        }
    }

    pub fn fallback(&self) -> Option<&GenerationFallback> {
        match self {
            JsonGeneration::Fallback(fallback) => Some(fallback),
            JsonGeneration::Parsed { .. } => None,
        }
    }
}

/// Entry point for all generation calls
///
/// Holds no per-call state; share it behind an `Arc` across tasks.
pub struct GenerationService {
    config: Arc<GenerationConfig>,
    factory: AdapterFactory,
    overrides: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    pipeline: JsonRepairPipeline,
}

impl GenerationService {
    /// Create a service with its own pooled HTTP client
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        Self::from_shared(Arc::new(config))
    }

    /// Create a service from shared configuration
    pub fn from_shared(config: Arc<GenerationConfig>) -> Result<Self, ConfigError> {
        let http = HttpClient::with_config(&config.connection)
            .map_err(|e| ConfigError::invalid_option("connection", e.to_string()))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a service on an existing HTTP client
    pub fn with_http_client(config: Arc<GenerationConfig>, http: HttpClient) -> Self {
        let pipeline = JsonRepairPipeline::new().with_preview_chars(config.repair.preview_chars);
        Self {
            config,
            factory: AdapterFactory::new(http),
            overrides: HashMap::new(),
            pipeline,
        }
    }

    /// Use `adapter` for every call to `kind` instead of the built-in one
    pub fn with_adapter(mut self, kind: ProviderKind, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.overrides.insert(kind, adapter);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Merge `options` with configuration without sending anything
    pub fn resolve(&self, options: &GenerationOptions) -> Result<ResolvedRequest, ConfigError> {
        resolve(&self.config, options)
    }

    /// Generate plain text
    pub async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, GenerationError> {
        let resolved = self.resolve(options)?;
        self.send(prompt, &resolved, false, options.cancellation.as_ref()).await
    }

    /// Generate a JSON document and deserialize it into `T`
    ///
    /// Output that cannot be repaired, or that repairs into the wrong shape,
    /// is regenerated up to `repair.max_attempts` times in total before a
    /// fallback is returned. Transport and configuration errors are returned
    /// immediately.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<JsonGeneration<T>, GenerationError> {
        let resolved = self.resolve(options)?;
        let cancellation = options.cancellation.as_ref();
        let max_attempts = self.config.repair.max_attempts.max(1);
        let preview_chars = self.config.repair.preview_chars;
        let mut last_fallback = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                self.backoff(attempt - 1, cancellation).await?;
            }

            let raw = self.send(prompt, &resolved, true, cancellation).await?;
            let outcome = self.pipeline.repair(&raw);
            let stage = outcome.stage;

            let fallback = if outcome.is_fallback() {
                let parse_error = outcome.parse_error.unwrap_or_default();
                GenerationFallback::new(format!("{}: {}", FALLBACK_ERROR, parse_error), preview(&raw, preview_chars))
            } else {
                match serde_json::from_value::<T>(outcome.value) {
                    Ok(value) => {
                        if stage != RepairStage::Direct {
                            info!(provider = %resolved.provider, stage = %stage, "model output needed repair");
                        }
                        return Ok(JsonGeneration::Parsed { value, stage });
                    }
                    Err(e) => GenerationFallback::new(
                        format!("Generated JSON did not match the expected shape: {}", e),
                        preview(&raw, preview_chars),
                    ),
                }
            };

            warn!(
                provider = %resolved.provider,
                model = %resolved.model,
                attempt = attempt + 1,
                max_attempts,
                error = %fallback.error,
                "unusable JSON from model"
            );
            last_fallback = Some(fallback);
        }

        Ok(JsonGeneration::Fallback(last_fallback.unwrap_or_else(|| {
            GenerationFallback::new(FALLBACK_ERROR, String::new())
        })))
    }

    /// Generate a JSON document, returning the fallback object inline
    pub async fn generate_json_value(&self, prompt: &str, options: &GenerationOptions) -> Result<Value, GenerationError> {
        Ok(match self.generate_json::<Value>(prompt, options).await? {
            JsonGeneration::Parsed { value, .. } => value,
            JsonGeneration::Fallback(fallback) => fallback.to_value(),
        })
    }

    fn adapter_for(&self, resolved: &ResolvedRequest) -> Result<Arc<dyn ProviderAdapter>, ConfigError> {
        if let Some(adapter) = self.overrides.get(&resolved.provider) {
            return Ok(Arc::clone(adapter));
        }
        let adapter = self.factory.create(resolved.provider, resolved.base_url.as_deref())?;
        Ok(Arc::from(adapter))
    }

    async fn send(
        &self,
        prompt: &str,
        resolved: &ResolvedRequest,
        json_mode: bool,
        cancellation: Option<&CancellationToken>,
    ) -> Result<String, GenerationError> {
        if cancellation.is_some_and(|token| token.is_cancelled()) {
            return Err(GenerationError::Cancelled);
        }

        let adapter = self.adapter_for(resolved)?;
        let options = resolved.send_options(json_mode, cancellation);

        info!(
            provider = %resolved.provider,
            model = %resolved.model,
            request_id = %options.request.request_id,
            json_mode,
            "generating"
        );

        let text = adapter
            .send(prompt, &options)
            .await
            .map_err(|e| GenerationError::from_provider(resolved.provider, e))?;

        debug!(request_id = %options.request.request_id, chars = text.chars().count(), "received completion");
        Ok(text)
    }

    async fn backoff(&self, attempt: u32, cancellation: Option<&CancellationToken>) -> Result<(), GenerationError> {
        let delay = self.config.repair.backoff.calculate_delay(attempt);
        debug!(delay_ms = delay.as_millis() as u64, "waiting before regeneration");

        match cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(GenerationError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_serializes_camel_case() {
        let fallback = GenerationFallback::new("boom", "{\"a\":");
        let value = serde_json::to_value(&fallback).unwrap();
        assert_eq!(value, fallback.to_value());
        assert_eq!(value["title"], "Generation Error");
        assert_eq!(value["rawPreview"], "{\"a\":");
    }

    #[test]
    fn test_json_generation_accessors() {
        let parsed: JsonGeneration<u32> = JsonGeneration::Parsed {
            value: 3,
            stage: RepairStage::Direct,
        };
        assert_eq!(parsed.value(), Some(&3));
        assert!(!parsed.is_fallback());

        let fallback: JsonGeneration<u32> = JsonGeneration::Fallback(GenerationFallback::new("e", ""));
        assert!(fallback.fallback().is_some());
        assert_eq!(fallback.into_value(), None);
    }
}
