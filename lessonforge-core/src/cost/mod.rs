//! Cost estimation for bulk content generation
//!
//! Estimates are rough planning numbers: a fixed token budget per generated
//! item times the blended per-token rate of a cost tier.

use crate::config::ConfigError;
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of content being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Flashcards,
    QuizQuestions,
    ExamQuestions,
    StudyNotes,
    TopicSummary,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Flashcards,
        ContentType::QuizQuestions,
        ContentType::ExamQuestions,
        ContentType::StudyNotes,
        ContentType::TopicSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Flashcards => "flashcards",
            ContentType::QuizQuestions => "quiz_questions",
            ContentType::ExamQuestions => "exam_questions",
            ContentType::StudyNotes => "study_notes",
            ContentType::TopicSummary => "topic_summary",
        }
    }

    /// Prompt plus completion tokens spent per generated item
    pub fn tokens_per_item(&self) -> u64 {
        match self {
            ContentType::Flashcards => 150,
            ContentType::QuizQuestions => 300,
            ContentType::ExamQuestions => 600,
            ContentType::StudyNotes => 1200,
            ContentType::TopicSummary => 800,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownContentType { name: s.to_string() })
    }
}

/// Named cost/quality bucket mapping to one provider and model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    UltraMinimal,
    Minimal,
    Standard,
    Premium,
}

impl CostTier {
    pub const ALL: [CostTier; 4] = [
        CostTier::UltraMinimal,
        CostTier::Minimal,
        CostTier::Standard,
        CostTier::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::UltraMinimal => "ultra_minimal",
            CostTier::Minimal => "minimal",
            CostTier::Standard => "standard",
            CostTier::Premium => "premium",
        }
    }

    /// Blended USD rate per million tokens
    pub fn usd_per_million_tokens(&self) -> f64 {
        match self {
            CostTier::UltraMinimal => 0.075,
            CostTier::Minimal => 0.15,
            CostTier::Standard => 1.25,
            CostTier::Premium => 3.00,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        match self {
            CostTier::UltraMinimal | CostTier::Standard => ProviderKind::Google,
            CostTier::Minimal => ProviderKind::OpenAI,
            CostTier::Premium => ProviderKind::Anthropic,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            CostTier::UltraMinimal => "gemini-1.5-flash-8b",
            CostTier::Minimal => "gpt-4o-mini",
            CostTier::Standard => "gemini-1.5-pro",
            CostTier::Premium => "claude-3-5-sonnet-20241022",
        }
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CostTier::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownCostTier { name: s.to_string() })
    }
}

/// Estimated spend for one generation job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub tokens_estimated: u64,
    pub cost_tier: CostTier,
    #[serde(rename = "estimatedCostUSD")]
    pub estimated_cost_usd: f64,
}

/// Estimate from string names as received from an admin form
pub fn estimate(content_type: &str, item_count: u32, cost_tier: &str) -> Result<CostEstimate, ConfigError> {
    Ok(estimate_for(content_type.parse()?, item_count, cost_tier.parse()?))
}

/// Estimate from typed values
pub fn estimate_for(content_type: ContentType, item_count: u32, cost_tier: CostTier) -> CostEstimate {
    let tokens_estimated = u64::from(item_count) * content_type.tokens_per_item();
    CostEstimate {
        tokens_estimated,
        cost_tier,
        estimated_cost_usd: tokens_estimated as f64 * cost_tier.usd_per_million_tokens() / 1_000_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_flashcards_minimal() {
        let estimate = estimate("flashcards", 100, "minimal").unwrap();
        assert_eq!(estimate.tokens_estimated, 15_000);
        assert_eq!(estimate.cost_tier, CostTier::Minimal);
        assert!((estimate.estimated_cost_usd - 0.00225).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_names_fail() {
        assert!(matches!(
            estimate("essays", 1, "minimal"),
            Err(ConfigError::UnknownContentType { .. })
        ));
        assert!(matches!(
            estimate("flashcards", 1, "luxury"),
            Err(ConfigError::UnknownCostTier { .. })
        ));
    }

    #[test]
    fn test_zero_items() {
        let estimate = estimate_for(ContentType::StudyNotes, 0, CostTier::Premium);
        assert_eq!(estimate.tokens_estimated, 0);
        assert_eq!(estimate.estimated_cost_usd, 0.0);
    }

    #[test]
    fn test_tiers_are_ordered_by_price() {
        let rates: Vec<f64> = CostTier::ALL.iter().map(|t| t.usd_per_million_tokens()).collect();
        assert!(rates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(estimate_for(ContentType::Flashcards, 1, CostTier::Standard)).unwrap();
        assert_eq!(value["tokensEstimated"], 150);
        assert_eq!(value["costTier"], "standard");
        assert!(value.get("estimatedCostUSD").is_some());
    }
}
