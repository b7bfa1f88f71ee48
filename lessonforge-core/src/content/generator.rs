//! Content generation on top of [`GenerationService`]

use super::batch::{BatchPlan, BatchReport};
use super::prompts::{exam_duration_minutes, exam_prompt, flashcard_prompt, quiz_prompt, EDUCATOR_SYSTEM_PROMPT};
use super::quality::QualityValidator;
use super::{ContentError, ExamPaper, ExamQuestion, FlashcardSet, QuizQuestion, TopicInfo};
use crate::generation::{GenerationError, GenerationFallback, GenerationOptions, GenerationService, JsonGeneration};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Largest number of quiz questions requested in one call
pub const QUIZ_BATCH_SIZE: u32 = 5;

/// Attempts made at an exam paper before giving up
pub const EXAM_ATTEMPTS: u32 = 3;

/// Quiz questions collected across batches
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuizBatch {
    pub topic_id: String,
    pub requested: u32,
    pub questions: Vec<QuizQuestion>,
    /// Fallbacks from batches that produced no usable JSON
    pub fallbacks: Vec<GenerationFallback>,
}

impl QuizBatch {
    pub fn is_complete(&self) -> bool {
        self.questions.len() as u32 >= self.requested
    }
}

#[derive(Debug, Default, Deserialize)]
struct QuestionsDraft {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ExamDraft {
    title: Option<String>,
    instructions: Option<String>,
    duration_minutes: Option<u32>,
    #[serde(default)]
    questions: Vec<Value>,
}

/// Generates flashcards, quizzes and exam papers for a topic
#[derive(Clone)]
pub struct ContentGenerator {
    service: Arc<GenerationService>,
    options: GenerationOptions,
    validator: QualityValidator,
}

impl ContentGenerator {
    pub fn new(service: Arc<GenerationService>) -> Self {
        Self {
            service,
            options: GenerationOptions::new(),
            validator: QualityValidator::new(),
        }
    }

    /// Options applied to every generation call
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_validator(mut self, validator: QualityValidator) -> Self {
        self.validator = validator;
        self
    }

    fn call_options(&self) -> GenerationOptions {
        let mut options = self.options.clone();
        if options.system_prompt.is_none() {
            options.system_prompt = Some(EDUCATOR_SYSTEM_PROMPT.to_string());
        }
        options
    }

    /// Generate `count` flashcards
    ///
    /// Cards missing either side are dropped.
    pub async fn generate_flashcards(
        &self,
        topic: &TopicInfo,
        count: u32,
    ) -> Result<JsonGeneration<FlashcardSet>, ContentError> {
        topic.validate()?;
        info!(topic = %topic.title, count, "generating flashcards");

        let generation = self
            .service
            .generate_json::<FlashcardSet>(&flashcard_prompt(topic, count), &self.call_options())
            .await?;

        Ok(match generation {
            JsonGeneration::Parsed { mut value, stage } => {
                let before = value.flashcards.len();
                value.flashcards.retain(|card| card.is_complete());
                if value.flashcards.len() < before {
                    warn!(dropped = before - value.flashcards.len(), "dropped incomplete flashcards");
                }
                JsonGeneration::Parsed { value, stage }
            }
            fallback => fallback,
        })
    }

    /// Generate `count` quiz questions in batches of at most five
    ///
    /// Stops early when a batch yields nothing usable, so the result may
    /// hold fewer questions than requested.
    pub async fn generate_quiz_questions(&self, topic: &TopicInfo, count: u32) -> Result<QuizBatch, ContentError> {
        topic.validate()?;
        info!(topic = %topic.title, count, "generating quiz questions");

        let options = self.call_options();
        let mut batch = QuizBatch {
            topic_id: topic.id.clone(),
            requested: count,
            ..QuizBatch::default()
        };
        let mut batch_number = 0u32;

        while !batch.is_complete() {
            batch_number += 1;
            let remaining = count - batch.questions.len() as u32;
            let size = remaining.min(QUIZ_BATCH_SIZE);

            let draft = match self
                .service
                .generate_json::<QuestionsDraft>(&quiz_prompt(topic, size), &options)
                .await?
            {
                JsonGeneration::Parsed { value, .. } => value,
                JsonGeneration::Fallback(fallback) => {
                    warn!(batch = batch_number, error = %fallback.error, "quiz batch fell back");
                    batch.fallbacks.push(fallback);
                    break;
                }
            };

            let questions: Vec<QuizQuestion> = draft
                .questions
                .into_iter()
                .enumerate()
                .filter_map(|(i, raw)| self.accept_quiz_question(topic, raw, batch_number, i))
                .take(size as usize)
                .collect();

            info!(batch = batch_number, accepted = questions.len(), "quiz batch completed");
            if questions.is_empty() {
                break;
            }
            batch.questions.extend(questions);
        }

        info!(topic = %topic.title, generated = batch.questions.len(), requested = count, "quiz generation finished");
        Ok(batch)
    }

    fn accept_quiz_question(&self, topic: &TopicInfo, raw: Value, batch: u32, index: usize) -> Option<QuizQuestion> {
        let mut question: QuizQuestion = match serde_json::from_value(raw) {
            Ok(question) => question,
            Err(e) => {
                warn!(batch, question = index + 1, error = %e, "skipping malformed quiz question");
                return None;
            }
        };
        question.difficulty_level.get_or_insert(topic.difficulty_level);

        if let Err(e) = question.validate() {
            warn!(batch, question = index + 1, error = %e, "skipping invalid quiz question");
            return None;
        }

        question.quality_score = Some(self.validator.validate_quiz_question(&question).quality_score);
        Some(question)
    }

    /// Fill every topic of `plan` with quiz questions, one topic at a time
    ///
    /// A failing topic is recorded in the report and the run moves on;
    /// only cancellation stops it.
    pub async fn generate_batch(&self, plan: &BatchPlan) -> Result<BatchReport, ContentError> {
        info!(topics = plan.needs.len(), questions = plan.total_questions(), "starting batch generation");
        let mut report = BatchReport::default();
        let mut scores = Vec::new();

        for need in &plan.needs {
            report.topics_processed += 1;
            match self.generate_quiz_questions(&need.topic, need.needed).await {
                Ok(batch) if !batch.questions.is_empty() => {
                    report.successful += 1;
                    report.questions_generated += batch.questions.len() as u32;
                    scores.extend(batch.questions.iter().filter_map(|q| q.quality_score));
                    report.batches.push(batch);
                }
                Ok(batch) => {
                    report.failed += 1;
                    report.errors.push(format!("{}: no usable questions", need.topic.title));
                    report.batches.push(batch);
                }
                Err(ContentError::Generation(GenerationError::Cancelled)) => {
                    warn!(processed = report.topics_processed, "batch generation cancelled");
                    return Err(GenerationError::Cancelled.into());
                }
                Err(e) => {
                    warn!(topic = %need.topic.title, error = %e, "topic failed");
                    report.failed += 1;
                    report.errors.push(format!("{}: {}", need.topic.title, e));
                }
            }
        }

        if !scores.is_empty() {
            report.average_quality_score = scores.iter().sum::<f64>() / scores.len() as f64;
        }
        info!(
            successful = report.successful,
            failed = report.failed,
            questions = report.questions_generated,
            "batch generation finished"
        );
        Ok(report)
    }

    /// Generate an exam paper worth roughly `total_marks`
    ///
    /// An attempt is accepted when its marks land within 20% of the target;
    /// the paper's total is then the actual sum. Returns `None` when no
    /// attempt qualifies.
    pub async fn generate_exam_paper(&self, topic: &TopicInfo, total_marks: u32) -> Result<Option<ExamPaper>, ContentError> {
        topic.validate()?;
        if total_marks == 0 {
            return Err(ContentError::invalid("total_marks", "must be positive"));
        }
        info!(topic = %topic.title, total_marks, "generating exam paper");

        let options = self.call_options();
        let prompt = exam_prompt(topic, total_marks);

        for attempt in 1..=EXAM_ATTEMPTS {
            let draft = match self.service.generate_json::<ExamDraft>(&prompt, &options).await? {
                JsonGeneration::Parsed { value, .. } => value,
                JsonGeneration::Fallback(fallback) => {
                    warn!(attempt, error = %fallback.error, "exam attempt fell back");
                    continue;
                }
            };

            let mut questions = Vec::new();
            for (i, raw) in draft.questions.iter().enumerate() {
                match parse_exam_question(raw, questions.len() as u32 + 1) {
                    Ok(question) => questions.push(question),
                    Err(e) => warn!(attempt, question = i + 1, error = %e, "skipping exam question"),
                }
            }

            let actual: u32 = questions.iter().map(|q| q.marks).sum();
            if questions.is_empty() || actual.abs_diff(total_marks) * 5 > total_marks {
                warn!(attempt, questions = questions.len(), marks = actual, target = total_marks, "exam attempt rejected");
                continue;
            }

            let paper = ExamPaper {
                title: draft
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("{}: {}", topic.subject_name, topic.title)),
                instructions: draft
                    .instructions
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "Answer ALL questions. Show all working clearly.".to_string()),
                duration_minutes: draft.duration_minutes.unwrap_or_else(|| exam_duration_minutes(actual)),
                total_marks: actual,
                questions,
                topic_id: topic.id.clone(),
                subject_name: topic.subject_name.clone(),
                difficulty_level: topic.difficulty_level,
            };

            if let Err(e) = paper.validate() {
                warn!(attempt, error = %e, "exam paper failed validation");
                continue;
            }

            info!(attempt, questions = paper.questions.len(), marks = actual, "exam paper generated");
            return Ok(Some(paper));
        }

        warn!(topic = %topic.title, "no usable exam paper after {} attempts", EXAM_ATTEMPTS);
        Ok(None)
    }
}

fn parse_exam_question(raw: &Value, next_order: u32) -> Result<ExamQuestion, ContentError> {
    let mut question: ExamQuestion =
        serde_json::from_value(raw.clone()).map_err(|e| ContentError::invalid("question", e.to_string()))?;
    if question.question_order == 0 {
        question.question_order = next_order;
    }
    question.validate()?;
    Ok(question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_exam_question_fills_order() {
        let raw = json!({
            "question_text": "Explain why enzymes denature at high temperatures.",
            "marks": 4,
            "answer_text": "The active site changes shape so the substrate no longer fits."
        });
        let question = parse_exam_question(&raw, 3).unwrap();
        assert_eq!(question.question_order, 3);
        assert_eq!(question.question_type, "structured");
    }

    #[test]
    fn test_parse_exam_question_rejects_missing_fields() {
        let raw = json!({"question_text": "Explain why enzymes denature at high temperatures.", "marks": 4});
        assert!(parse_exam_question(&raw, 1).is_err());

        let raw = json!({
            "question_text": "Explain why enzymes denature at high temperatures.",
            "marks": 40,
            "answer_text": "The active site changes shape so the substrate no longer fits."
        });
        assert!(parse_exam_question(&raw, 1).is_err());
    }

    #[test]
    fn test_quiz_batch_completion() {
        let batch = QuizBatch {
            requested: 0,
            ..QuizBatch::default()
        };
        assert!(batch.is_complete());
    }
}
