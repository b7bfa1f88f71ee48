//! Planning bulk quiz generation across many topics
//!
//! Topics short of questions are ranked so the emptiest are filled first,
//! and the plan never asks for more questions than the day's budget has
//! left. Counting existing questions is up to the caller.

use super::generator::QuizBatch;
use super::TopicInfo;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Thresholds and budget for a bulk run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Topics below this count are high priority
    pub min_questions_per_topic: u32,

    /// Topics at or above this count are left alone
    pub target_questions_per_topic: u32,

    /// Most questions requested for one topic in one run
    pub max_questions_per_run: u32,

    /// Questions that may be generated per day
    pub daily_budget: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            min_questions_per_topic: 20,
            target_questions_per_topic: 50,
            max_questions_per_run: 20,
            daily_budget: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
}

/// A topic and how many questions it already has
#[derive(Debug, Clone, PartialEq)]
pub struct TopicStock {
    pub topic: TopicInfo,
    pub question_count: u32,
}

impl TopicStock {
    pub fn new(topic: TopicInfo, question_count: u32) -> Self {
        Self { topic, question_count }
    }
}

/// One topic scheduled for generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNeed {
    pub topic: TopicInfo,
    pub current_questions: u32,
    pub needed: u32,
    pub priority: Priority,
}

/// Ordered work for a bulk run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchPlan {
    pub needs: Vec<TopicNeed>,
    /// Ids of topics that needed questions but did not fit the budget
    pub deferred: Vec<String>,
    /// Budget left once the plan is fully generated
    pub budget_remaining: u32,
}

impl BatchPlan {
    pub fn is_empty(&self) -> bool {
        self.needs.is_empty()
    }

    pub fn total_questions(&self) -> u32 {
        self.needs.iter().map(|n| n.needed).sum()
    }
}

/// Rank topics by need and fit them into what is left of the daily budget
///
/// `subject` keeps only topics of that subject; `max_topics` caps the plan
/// after ranking. High priority topics come first, then the larger need.
pub fn plan_batch(
    stock: &[TopicStock],
    config: &BatchConfig,
    used_today: u32,
    subject: Option<&str>,
    max_topics: Option<usize>,
) -> BatchPlan {
    let mut candidates: Vec<TopicNeed> = stock
        .iter()
        .filter(|s| subject.map_or(true, |name| s.topic.subject_name == name))
        .filter_map(|s| {
            let priority = if s.question_count < config.min_questions_per_topic {
                Priority::High
            } else if s.question_count < config.target_questions_per_topic {
                Priority::Medium
            } else {
                return None;
            };
            Some(TopicNeed {
                topic: s.topic.clone(),
                current_questions: s.question_count,
                needed: (config.target_questions_per_topic - s.question_count).min(config.max_questions_per_run),
                priority,
            })
        })
        .filter(|need| need.needed > 0)
        .collect();

    candidates.sort_by_key(|need| (Reverse(need.priority), Reverse(need.needed)));
    if let Some(max) = max_topics {
        candidates.truncate(max);
    }

    let mut remaining = config.daily_budget.saturating_sub(used_today);
    let mut plan = BatchPlan::default();
    for mut need in candidates {
        if remaining == 0 {
            plan.deferred.push(need.topic.id);
            continue;
        }
        need.needed = need.needed.min(remaining);
        remaining -= need.needed;
        debug!(topic = %need.topic.title, needed = need.needed, priority = ?need.priority, "planned topic");
        plan.needs.push(need);
    }
    plan.budget_remaining = remaining;

    info!(
        topics = plan.needs.len(),
        questions = plan.total_questions(),
        deferred = plan.deferred.len(),
        "batch planned"
    );
    plan
}

/// Outcome of running a [`BatchPlan`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub topics_processed: u32,
    pub successful: u32,
    pub failed: u32,
    pub questions_generated: u32,
    /// Mean quality score over every generated question
    pub average_quality_score: f64,
    pub errors: Vec<String>,
    pub batches: Vec<QuizBatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, subject: &str, count: u32) -> TopicStock {
        TopicStock::new(TopicInfo::new(id, id, subject, 2), count)
    }

    #[test]
    fn test_orders_by_priority_then_need() {
        let topics = [
            stock("nearly-full", "Biology", 45),
            stock("empty", "Biology", 0),
            stock("half", "Biology", 25),
            stock("sparse", "Biology", 15),
            stock("full", "Biology", 50),
        ];
        let plan = plan_batch(&topics, &BatchConfig::default(), 0, None, None);

        let order: Vec<_> = plan.needs.iter().map(|n| n.topic.id.as_str()).collect();
        assert_eq!(order, ["empty", "sparse", "half", "nearly-full"]);
        assert_eq!(plan.needs[0].priority, Priority::High);
        assert_eq!(plan.needs[0].needed, 20);
        assert_eq!(plan.needs[3].priority, Priority::Medium);
        assert_eq!(plan.needs[3].needed, 5);
    }

    #[test]
    fn test_budget_trims_and_defers() {
        let topics = [stock("a", "Biology", 0), stock("b", "Biology", 0), stock("c", "Biology", 0)];
        let plan = plan_batch(&topics, &BatchConfig::default(), 70, None, None);

        assert_eq!(plan.needs.len(), 2);
        assert_eq!(plan.needs[0].needed, 20);
        assert_eq!(plan.needs[1].needed, 10);
        assert_eq!(plan.deferred, ["c"]);
        assert_eq!(plan.budget_remaining, 0);
    }

    #[test]
    fn test_spent_budget_plans_nothing() {
        let topics = [stock("a", "Biology", 0)];
        let plan = plan_batch(&topics, &BatchConfig::default(), 100, None, None);
        assert!(plan.is_empty());
        assert_eq!(plan.deferred, ["a"]);
    }

    #[test]
    fn test_subject_filter_and_topic_cap() {
        let topics = [
            stock("cells", "Biology", 0),
            stock("forces", "Physics", 0),
            stock("enzymes", "Biology", 10),
        ];
        let plan = plan_batch(&topics, &BatchConfig::default(), 0, Some("Biology"), Some(1));

        assert_eq!(plan.needs.len(), 1);
        assert_eq!(plan.needs[0].topic.id, "cells");
        assert!(plan.deferred.is_empty());
        assert_eq!(plan.budget_remaining, 80);
    }

    #[test]
    fn test_config_from_yaml_with_defaults() {
        let config: BatchConfig = serde_yaml::from_str("daily_budget: 40").unwrap();
        assert_eq!(config.daily_budget, 40);
        assert_eq!(config.target_questions_per_topic, 50);
        assert!(serde_yaml::from_str::<BatchConfig>("budget: 1").is_err());
    }
}
