//! Secret handling for provider credentials
//!
//! API keys travel through configuration, per-call options and request
//! headers. They are wrapped in [`SecretString`] so that `Debug`, `Display`
//! and tracing output never print the raw value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wrapper type for sensitive strings like API keys
#[derive(Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the actual value (use with caution)
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    /// Check if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Get a partially redacted version for debugging
    pub fn partial_redact(&self) -> String {
        if self.value.is_empty() {
            return "[EMPTY]".to_string();
        }

        let chars: Vec<char> = self.value.chars().collect();
        let len = chars.len();
        if len <= 8 {
            "[REDACTED]".to_string()
        } else if self.value.starts_with("sk-") || self.value.starts_with("hf_") {
            let head: String = chars[..3].iter().collect();
            let tail: String = chars[len - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[len - 2..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Redact a header or field value when its name looks sensitive
pub fn redact_by_field_name(field_name: &str, value: &str) -> String {
    let sensitive_patterns = [
        "api_key",
        "api-key",
        "x-api-key",
        "authorization",
        "secret",
        "token",
        "key",
    ];

    let field_lower = field_name.to_lowercase();
    let is_sensitive = sensitive_patterns
        .iter()
        .any(|pattern| field_lower.contains(pattern));

    if is_sensitive {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redaction() {
        let secret = SecretString::new("sk-1234567890abcdef");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(secret.partial_redact(), "sk-...cdef");
    }

    #[test]
    fn test_partial_redact_short_and_plain() {
        assert_eq!(SecretString::new("").partial_redact(), "[EMPTY]");
        assert_eq!(SecretString::new("short").partial_redact(), "[REDACTED]");
        assert_eq!(SecretString::new("AIzaSyExample99").partial_redact(), "AI...99");
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("my-secret-value");
        assert_eq!(secret.expose_secret(), "my-secret-value");
    }

    #[test]
    fn test_redact_by_field_name() {
        assert_eq!(redact_by_field_name("Authorization", "Bearer sk-123"), "[REDACTED]");
        assert_eq!(redact_by_field_name("x-api-key", "abc"), "[REDACTED]");
        assert_eq!(redact_by_field_name("anthropic-version", "2023-06-01"), "2023-06-01");
        assert_eq!(redact_by_field_name("Content-Type", "application/json"), "application/json");
    }
}
