//! Provider error types and handling

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// What went wrong talking to a vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The vendor answered with a non-2xx status
    Http,
    /// The call exceeded its timeout
    Timeout,
    /// The caller cancelled the in-flight request
    Cancelled,
    /// Connection, DNS or body transfer failure
    Network,
    /// A 2xx response whose envelope held no usable text
    InvalidResponse,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderErrorKind::Http => "http",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Cancelled => "cancelled",
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::InvalidResponse => "invalid_response",
        };
        f.write_str(name)
    }
}

/// Error raised by a provider adapter
#[derive(Debug, Clone, Error)]
#[error("{kind} error{}: {message}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
pub struct ProviderError {
    /// HTTP status code, when the vendor answered at all
    pub status: Option<u16>,
    /// Vendor message or transport description
    pub message: String,
    /// Error category
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    /// Non-2xx response from the vendor
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            kind: ProviderErrorKind::Http,
        }
    }

    /// The call exceeded `timeout`
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            status: None,
            message: format!("request timed out after {:?}", timeout),
            kind: ProviderErrorKind::Timeout,
        }
    }

    /// The caller cancelled the request
    pub fn cancelled() -> Self {
        Self {
            status: None,
            message: "request cancelled by caller".to_string(),
            kind: ProviderErrorKind::Cancelled,
        }
    }

    /// Transport-level failure
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            kind: ProviderErrorKind::Network,
        }
    }

    /// Response envelope did not have the expected shape
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            kind: ProviderErrorKind::InvalidResponse,
        }
    }

    /// Whether a caller-side retry could plausibly succeed
    ///
    /// The core never retries transport errors itself.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ProviderErrorKind::Timeout | ProviderErrorKind::Network => true,
            ProviderErrorKind::Http => matches!(self.status, Some(408 | 429 | 500..=599)),
            ProviderErrorKind::Cancelled | ProviderErrorKind::InvalidResponse => false,
        }
    }

    /// Whether this is a caller cancellation
    pub fn is_cancelled(&self) -> bool {
        self.kind == ProviderErrorKind::Cancelled
    }
}
