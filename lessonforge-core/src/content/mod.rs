//! Educational content generated on top of [`GenerationService`](crate::generation::GenerationService)
//!
//! Typed flashcards, quiz questions and exam papers, the prompts that ask a
//! model for them, and a heuristic quality validator. Persisting the results
//! is left to the calling application.

pub mod batch;
pub mod generator;
pub mod prompts;
pub mod quality;

pub use batch::{plan_batch, BatchConfig, BatchPlan, BatchReport, Priority, TopicNeed, TopicStock};
pub use generator::{ContentGenerator, QuizBatch};
pub use prompts::{exam_distribution, exam_duration_minutes, exam_prompt, flashcard_prompt, quiz_prompt, MarkBand};
pub use quality::{QualityIssue, QualityReport, QualityValidator, Severity};

use crate::generation::GenerationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from content generation
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ContentError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn require_chars(field: &str, text: &str, min: usize) -> Result<(), ContentError> {
    let len = text.trim().chars().count();
    if len < min {
        return Err(ContentError::invalid(
            field,
            format!("must be at least {} characters, got {}", min, len),
        ));
    }
    Ok(())
}

fn require_range(field: &str, value: u32, range: std::ops::RangeInclusive<u32>) -> Result<(), ContentError> {
    if !range.contains(&value) {
        return Err(ContentError::invalid(
            field,
            format!("{} is outside {}..={}", value, range.start(), range.end()),
        ));
    }
    Ok(())
}

/// Topic context passed into prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub id: String,
    pub title: String,
    pub subject_name: String,
    /// 1 (very easy) to 5 (very hard)
    pub difficulty_level: u8,
    #[serde(default)]
    pub syllabus_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

impl TopicInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>, subject_name: impl Into<String>, difficulty_level: u8) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subject_name: subject_name.into(),
            difficulty_level,
            syllabus_code: String::new(),
            description: String::new(),
            learning_objectives: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        for (field, value) in [("id", &self.id), ("title", &self.title), ("subject_name", &self.subject_name)] {
            if value.trim().is_empty() {
                return Err(ContentError::invalid(field, "is required"));
            }
        }
        require_range("difficulty_level", u32::from(self.difficulty_level), 1..=5)
    }
}

/// One flashcard
///
/// Both sides default to empty so a card cut short by truncation still
/// deserializes; [`Flashcard::is_complete`] then filters it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub front_content: String,
    #[serde(default)]
    pub back_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Flashcard {
    pub fn is_complete(&self) -> bool {
        !self.front_content.trim().is_empty() && !self.back_content.trim().is_empty()
    }
}

/// Flashcards as returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlashcardSet {
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

/// A quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    /// Option label (`A`..`D`) to option text
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default)]
    pub difficulty_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filled in by [`QualityValidator`] after generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

fn default_points() -> u32 {
    1
}

impl QuizQuestion {
    /// Structural checks a question must pass to be kept at all
    pub fn validate(&self) -> Result<(), ContentError> {
        require_chars("question_text", &self.question_text, 10)?;
        if self.correct_answer.trim().is_empty() {
            return Err(ContentError::invalid("correct_answer", "is required"));
        }
        require_chars("explanation", &self.explanation, 10)?;
        if self.question_type == QuestionType::MultipleChoice && self.options.len() < 2 {
            return Err(ContentError::invalid("options", "multiple choice needs at least 2 options"));
        }
        require_range("points", self.points, 1..=10)?;
        if let Some(level) = self.difficulty_level {
            require_range("difficulty_level", u32::from(level), 1..=5)?;
        }
        Ok(())
    }
}

fn default_exam_question_type() -> String {
    "structured".to_string()
}

/// One question on an exam paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub question_text: String,
    pub marks: u32,
    /// Marking scheme or model answer
    pub answer_text: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub question_order: u32,
    #[serde(default = "default_exam_question_type")]
    pub question_type: String,
}

impl ExamQuestion {
    pub fn validate(&self) -> Result<(), ContentError> {
        require_chars("question_text", &self.question_text, 20)?;
        require_chars("answer_text", &self.answer_text, 10)?;
        require_range("marks", self.marks, 1..=20)?;
        if self.question_order < 1 {
            return Err(ContentError::invalid("question_order", "must be positive"));
        }
        Ok(())
    }
}

/// A complete exam paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub title: String,
    pub instructions: String,
    pub duration_minutes: u32,
    pub total_marks: u32,
    pub questions: Vec<ExamQuestion>,
    pub topic_id: String,
    pub subject_name: String,
    pub difficulty_level: u8,
}

impl ExamPaper {
    pub fn marks_sum(&self) -> u32 {
        self.questions.iter().map(|q| q.marks).sum()
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() || self.instructions.trim().is_empty() {
            return Err(ContentError::invalid("title", "title and instructions are required"));
        }
        if self.questions.is_empty() {
            return Err(ContentError::invalid("questions", "at least one question is required"));
        }
        if self.duration_minutes < 10 {
            return Err(ContentError::invalid("duration_minutes", "must be at least 10 minutes"));
        }
        if self.total_marks < 1 {
            return Err(ContentError::invalid("total_marks", "must be positive"));
        }
        let sum = self.marks_sum();
        if sum != self.total_marks {
            return Err(ContentError::invalid(
                "total_marks",
                format!("question marks ({}) don't match total marks ({})", sum, self.total_marks),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_question() -> QuizQuestion {
        serde_json::from_value(json!({
            "question_text": "Which organelle is the site of photosynthesis?",
            "options": {"A": "Mitochondrion", "B": "Chloroplast", "C": "Nucleus", "D": "Ribosome"},
            "correct_answer": "B",
            "explanation": "Chloroplasts contain chlorophyll, which absorbs light energy to drive photosynthesis."
        }))
        .unwrap()
    }

    #[test]
    fn test_topic_validation() {
        assert!(TopicInfo::new("t1", "Cells", "Biology", 3).validate().is_ok());
        assert!(TopicInfo::new("t1", "", "Biology", 3).validate().is_err());
        assert!(TopicInfo::new("t1", "Cells", "Biology", 6).validate().is_err());
    }

    #[test]
    fn test_quiz_question_defaults() {
        let question = sample_question();
        assert_eq!(question.question_type, QuestionType::MultipleChoice);
        assert_eq!(question.points, 1);
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_quiz_question_rejects_bad_points() {
        let mut question = sample_question();
        question.points = 11;
        assert!(matches!(question.validate(), Err(ContentError::Invalid { field, .. }) if field == "points"));
    }

    #[test]
    fn test_exam_paper_marks_must_match() {
        let question = ExamQuestion {
            question_text: "Describe the process of osmosis in plant root hair cells.".to_string(),
            marks: 5,
            answer_text: "Water moves from dilute soil water into the cell sap across a partially permeable membrane.".to_string(),
            explanation: String::new(),
            question_order: 1,
            question_type: default_exam_question_type(),
        };
        let mut paper = ExamPaper {
            title: "Biology: Transport".to_string(),
            instructions: "Answer ALL questions.".to_string(),
            duration_minutes: 60,
            total_marks: 5,
            questions: vec![question],
            topic_id: "t1".to_string(),
            subject_name: "Biology".to_string(),
            difficulty_level: 3,
        };
        assert!(paper.validate().is_ok());

        paper.total_marks = 20;
        assert!(paper.validate().is_err());
    }

    #[test]
    fn test_flashcard_completeness() {
        let set: FlashcardSet = serde_json::from_value(json!({
            "flashcards": [{"front_content": "Q", "back_content": "A"}, {"front_content": "Q2", "back_content": " "}]
        }))
        .unwrap();
        assert!(set.flashcards[0].is_complete());
        assert!(!set.flashcards[1].is_complete());
    }

    #[test]
    fn test_flashcard_missing_side_deserializes_incomplete() {
        let set: FlashcardSet = serde_json::from_value(json!({
            "flashcards": [{"front_content": "Q1", "back_content": "A1"}, {"front_content": "Q2"}]
        }))
        .unwrap();
        assert_eq!(set.flashcards.len(), 2);
        assert!(set.flashcards[0].is_complete());
        assert_eq!(set.flashcards[1].back_content, "");
        assert!(!set.flashcards[1].is_complete());
    }
}
