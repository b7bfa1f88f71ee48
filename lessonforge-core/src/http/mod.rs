//! HTTP transport shared by all provider adapters
//!
//! This module handles:
//! - Connection pooling and client management
//! - Per-call timeouts and cooperative cancellation
//! - Error mapping from vendor error envelopes
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::{HttpClient, JsonRequest};

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Default per-call timeout when the caller does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for an HTTP request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Request timeout
    pub timeout: Duration,

    /// Cancellation signal from the caller
    pub cancellation: Option<CancellationToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: DEFAULT_TIMEOUT,
            cancellation: None,
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
