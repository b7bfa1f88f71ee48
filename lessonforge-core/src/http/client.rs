//! HTTP client implementation using reqwest

use crate::config::{redact_by_field_name, ConnectionConfig};
use crate::http::RequestOptions;
use crate::providers::{ProviderError, ProviderResult};
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("lessonforge/", env!("CARGO_PKG_VERSION"));

/// A JSON POST as built by an adapter
#[derive(Debug, Clone)]
pub struct JsonRequest {
    /// Full URL including any query parameters
    pub url: String,
    /// Headers besides content type
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl JsonRequest {
    /// Create a request for `url` with `body`
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> ProviderResult<Self> {
        Self::with_config(&ConnectionConfig::default())
    }

    /// Create a new HTTP client from connection settings
    pub fn with_config(config: &ConnectionConfig) -> ProviderResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// POST a JSON body and parse the JSON response
    ///
    /// Races the request against the caller's cancellation token; the
    /// timeout in `options` bounds the whole exchange including the body.
    pub async fn post_json(
        &self,
        provider: &str,
        request: JsonRequest,
        options: &RequestOptions,
    ) -> ProviderResult<Value> {
        let exchange = self.exchange(provider, request, options);

        match &options.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!(provider, request_id = %options.request_id, "request cancelled");
                        Err(ProviderError::cancelled())
                    }
                    result = exchange => result,
                }
            }
            None => exchange.await,
        }
    }

    async fn exchange(
        &self,
        provider: &str,
        request: JsonRequest,
        options: &RequestOptions,
    ) -> ProviderResult<Value> {
        let request_id = options.request_id;

        info!(provider, request_id = %request_id, "executing HTTP request");
        debug!(
            provider,
            request_id = %request_id,
            url = %redact_query(&request.url),
            headers = ?request
                .headers
                .iter()
                .map(|(k, v)| format!("{}: {}", k, redact_by_field_name(k, v)))
                .collect::<Vec<_>>(),
            "request details"
        );

        let mut req_builder = self
            .client
            .post(&request.url)
            .timeout(options.timeout)
            .json(&request.body);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        req_builder = req_builder.header("X-Request-ID", request_id.to_string());

        let response = req_builder
            .send()
            .await
            .map_err(|e| self.map_send_error(provider, e, options))?;

        let status = response.status();
        debug!(provider, request_id = %request_id, %status, "response status");

        if !status.is_success() {
            let body = response.text().await.ok();

            warn!(provider, request_id = %request_id, %status, "request failed");

            return Err(crate::http::error::map_http_error(status, body, request_id));
        }

        self.check_content_length(&response)?;

        let response_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout(options.timeout)
            } else {
                ProviderError::network(format!(
                    "Failed to read response body: {} [request_id: {}]",
                    e, request_id
                ))
            }
        })?;

        if response_text.len() > self.max_response_size {
            return Err(ProviderError::invalid_response(format!(
                "Response size {} exceeds maximum {} [request_id: {}]",
                response_text.len(),
                self.max_response_size,
                request_id
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(provider, request_id = %request_id, error = %e, "response body is not JSON");
            ProviderError::invalid_response(format!(
                "Invalid response format: {} [request_id: {}]",
                e, request_id
            ))
        })?;

        info!(provider, request_id = %request_id, "request completed");

        Ok(response_json)
    }

    fn map_send_error(
        &self,
        provider: &str,
        e: reqwest::Error,
        options: &RequestOptions,
    ) -> ProviderError {
        let request_id = options.request_id;
        if e.is_timeout() {
            warn!(provider, request_id = %request_id, "request timeout");
            ProviderError::timeout(options.timeout)
        } else if e.is_connect() {
            error!(provider, request_id = %request_id, error = %e, "connection error");
            ProviderError::network(format!("Connection failed: {} [request_id: {}]", e, request_id))
        } else {
            error!(provider, request_id = %request_id, error = %e, "request error");
            ProviderError::network(format!("{} [request_id: {}]", e, request_id))
        }
    }

    /// Check response size to prevent OOM
    fn check_content_length(&self, response: &Response) -> ProviderResult<()> {
        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(ProviderError::invalid_response(format!(
                    "Response size {} exceeds maximum {}",
                    content_length, self.max_response_size
                )));
            }
        }

        Ok(())
    }
}

/// Hide query strings in logs; Google passes its key there
fn redact_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?[REDACTED]", base),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_query() {
        assert_eq!(
            redact_query("https://x/models/m:generateContent?key=abc"),
            "https://x/models/m:generateContent?[REDACTED]"
        );
        assert_eq!(redact_query("https://x/chat"), "https://x/chat");
    }

    #[test]
    fn test_json_request_builder() {
        let req = JsonRequest::new("http://localhost/x", serde_json::json!({"a": 1}))
            .header("Authorization", "Bearer k");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.body["a"], 1);
    }
}
