//! Backoff between regeneration attempts
//!
//! When the repair pipeline gives up on a model response, the service asks
//! the model again. The delay between those attempts grows exponentially
//! with jitter so that concurrent callers do not regenerate in lockstep.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for regeneration backoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Delay before the first regeneration (milliseconds)
    pub initial_delay_ms: u64,

    /// Maximum delay between attempts (milliseconds)
    pub max_delay_ms: u64,

    /// Base for exponential backoff (e.g., 2.0 for doubling)
    pub exponential_base: f64,

    /// Jitter factor (0.0 to 1.0) to randomize delays
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 250,
            max_delay_ms: 5_000,
            exponential_base: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy that regenerates immediately
    pub fn no_delay() -> Self {
        Self {
            initial_delay_ms: 0,
            max_delay_ms: 0,
            exponential_base: 1.0,
            jitter_factor: 0.0,
        }
    }

    /// Calculate the delay before regeneration number `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.exponential_base.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let delay_with_jitter = if self.jitter_factor > 0.0 && capped_delay > 0.0 {
            let mut rng = rand::thread_rng();
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rng.gen_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(delay_with_jitter as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.initial_delay_ms, 250);
        assert_eq!(policy.exponential_base, 2.0);
    }

    #[test]
    fn test_exponential_backoff_calculation() {
        let policy = RetryPolicy {
            initial_delay_ms: 100,
            max_delay_ms: 1000,
            exponential_base: 2.0,
            jitter_factor: 0.0,
        };

        assert_eq!(policy.calculate_delay(0).as_millis(), 100);
        assert_eq!(policy.calculate_delay(1).as_millis(), 200);
        assert_eq!(policy.calculate_delay(3).as_millis(), 800);
        // 1600ms capped at max
        assert_eq!(policy.calculate_delay(4).as_millis(), 1000);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryPolicy {
            initial_delay_ms: 1000,
            max_delay_ms: 1000,
            exponential_base: 2.0,
            jitter_factor: 0.2,
        };
        for _ in 0..50 {
            let ms = policy.calculate_delay(0).as_millis();
            assert!((800..=1200).contains(&ms), "{}", ms);
        }
    }

    #[test]
    fn test_no_delay() {
        assert_eq!(RetryPolicy::no_delay().calculate_delay(5), Duration::ZERO);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let policy: RetryPolicy = serde_yaml::from_str("initial_delay_ms: 10").unwrap();
        assert_eq!(policy.initial_delay_ms, 10);
        assert_eq!(policy.max_delay_ms, 5_000);
    }
}
