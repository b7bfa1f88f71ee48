//! Deterministic cost-tier and provider rollout
//!
//! A user segment is hashed together with the rollout window name into one
//! of 10 000 buckets, and buckets are handed out to tiers by cumulative
//! weight. The same segment lands in the same tier for as long as the window
//! and weights stay the same; renaming the window reshuffles everyone.

use crate::cost::CostTier;
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

/// Number of hash buckets a segment can fall into
pub const BUCKET_COUNT: u64 = 10_000;

/// Share of traffic assigned to one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierWeight {
    pub tier: CostTier,
    pub weight: u32,
}

/// Weighted tier assignment for one rollout window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RolloutPolicy {
    /// Name of the rollout window; part of the hash input
    pub window: String,

    /// Tier used when no bucket carries weight
    pub default_tier: CostTier,

    #[serde(default)]
    pub buckets: Vec<TierWeight>,
}

impl RolloutPolicy {
    /// Policy that sends everyone to `tier`
    pub fn fixed(window: impl Into<String>, tier: CostTier) -> Self {
        Self {
            window: window.into(),
            default_tier: tier,
            buckets: Vec::new(),
        }
    }

    /// Two-way migration moving `percent` of segments from `from` to `to`
    pub fn percentage(window: impl Into<String>, from: CostTier, to: CostTier, percent: u8) -> Self {
        let percent = u32::from(percent.min(100));
        Self {
            window: window.into(),
            default_tier: from,
            buckets: vec![
                TierWeight {
                    tier: to,
                    weight: percent,
                },
                TierWeight {
                    tier: from,
                    weight: 100 - percent,
                },
            ],
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.weight)).sum()
    }
}

/// Hash `segment` within `window` into `0..BUCKET_COUNT`
pub fn bucket_for(window: &str, segment: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(window.as_bytes());
    hasher.update([0u8]);
    hasher.update(segment.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) % BUCKET_COUNT
}

/// Pick the entry whose cumulative weight range contains `bucket`
fn pick_weighted<T: Copy>(bucket: u64, entries: impl Iterator<Item = (T, u32)> + Clone) -> Option<T> {
    let total: u64 = entries.clone().map(|(_, w)| u64::from(w)).sum();
    if total == 0 {
        return None;
    }

    // Scale the bucket into the weight range so weights need not sum to 100
    let point = bucket * total / BUCKET_COUNT;
    let mut cumulative = 0u64;
    for (item, weight) in entries {
        cumulative += u64::from(weight);
        if point < cumulative {
            return Some(item);
        }
    }
    None
}

/// Select the cost tier for `user_segment`
pub fn select_tier(user_segment: &str, policy: &RolloutPolicy) -> CostTier {
    let bucket = bucket_for(&policy.window, user_segment);
    let tier = pick_weighted(bucket, policy.buckets.iter().map(|b| (b.tier, b.weight)))
        .unwrap_or(policy.default_tier);
    trace!(window = %policy.window, bucket, tier = %tier, "selected cost tier");
    tier
}

/// Select a provider for `user_segment` from weighted candidates
///
/// Returns `None` when no candidate carries weight.
pub fn select_provider(window: &str, user_segment: &str, weights: &[(ProviderKind, u32)]) -> Option<ProviderKind> {
    pick_weighted(bucket_for(window, user_segment), weights.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_deterministic() {
        let policy = RolloutPolicy::percentage("2024-q3", CostTier::Minimal, CostTier::UltraMinimal, 30);
        for segment in ["school-1", "school-2", "teacher:42"] {
            assert_eq!(select_tier(segment, &policy), select_tier(segment, &policy));
        }
    }

    #[test]
    fn test_empty_policy_uses_default() {
        let policy = RolloutPolicy::fixed("w", CostTier::Premium);
        assert_eq!(select_tier("anyone", &policy), CostTier::Premium);

        let zero = RolloutPolicy {
            window: "w".to_string(),
            default_tier: CostTier::Standard,
            buckets: vec![TierWeight {
                tier: CostTier::Premium,
                weight: 0,
            }],
        };
        assert_eq!(select_tier("anyone", &zero), CostTier::Standard);
    }

    #[test]
    fn test_percentage_extremes() {
        let none = RolloutPolicy::percentage("w", CostTier::Minimal, CostTier::Premium, 0);
        let all = RolloutPolicy::percentage("w", CostTier::Minimal, CostTier::Premium, 100);
        for i in 0..200 {
            let segment = format!("user-{}", i);
            assert_eq!(select_tier(&segment, &none), CostTier::Minimal);
            assert_eq!(select_tier(&segment, &all), CostTier::Premium);
        }
    }

    #[test]
    fn test_split_roughly_matches_weights() {
        let policy = RolloutPolicy::percentage("w", CostTier::Minimal, CostTier::UltraMinimal, 25);
        let migrated = (0..4000)
            .filter(|i| select_tier(&format!("segment-{}", i), &policy) == CostTier::UltraMinimal)
            .count();
        assert!((800..1200).contains(&migrated), "{}", migrated);
    }

    #[test]
    fn test_window_is_part_of_hash() {
        let differing = (0..100)
            .filter(|i| {
                let segment = format!("s{}", i);
                bucket_for("a", &segment) != bucket_for("b", &segment)
            })
            .count();
        assert!(differing > 90);
        assert!(bucket_for("a", "s") < BUCKET_COUNT);
    }

    #[test]
    fn test_select_provider() {
        let weights = [(ProviderKind::OpenAI, 0), (ProviderKind::Google, 5)];
        assert_eq!(select_provider("w", "x", &weights), Some(ProviderKind::Google));
        assert_eq!(select_provider("w", "x", &[]), None);
    }
}
