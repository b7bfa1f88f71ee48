//! Heuristic quality checks for generated questions and papers
//!
//! The validator never rejects content on its own; it produces a report
//! with a score in `[0, 1]` that callers use to filter or flag items.

use super::{ExamPaper, ExamQuestion, QuizQuestion};
use serde::Serialize;
use std::fmt;

const POOR_QUALITY_INDICATORS: &[&str] = &[
    "i don't know",
    "not sure",
    "maybe",
    "probably",
    "i think",
    "lorem ipsum",
    "placeholder",
    "example",
    "test question",
];

const ACADEMIC_INDICATORS: &[&str] = &[
    "analyze",
    "evaluate",
    "compare",
    "contrast",
    "explain",
    "describe",
    "calculate",
    "determine",
    "identify",
    "classify",
    "interpret",
];

const INSTRUCTION_WORDS: &[&str] = &["calculate", "determine", "find", "show"];

const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn penalty(self) -> f64 {
        match self {
            Severity::Critical => 0.3,
            Severity::Error => 0.2,
            Severity::Warning => 0.1,
            Severity::Info => 0.05,
        }
    }

    /// Error and Critical issues make an item invalid
    pub fn is_blocking(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub message: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl QualityIssue {
    fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            field: field.into(),
            suggestion: None,
        }
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub is_valid: bool,
    pub quality_score: f64,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    fn from_issues(issues: Vec<QualityIssue>) -> Self {
        let penalty: f64 = issues.iter().map(|i| i.severity.penalty()).sum();
        Self {
            is_valid: !issues.iter().any(|i| i.severity.is_blocking()),
            quality_score: (1.0 - penalty).clamp(0.0, 1.0),
            issues,
        }
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Length limits applied by [`QualityValidator`]
#[derive(Debug, Clone, Copy)]
pub struct QualityThresholds {
    pub min_question_chars: usize,
    pub max_question_chars: usize,
    pub min_explanation_chars: usize,
    pub max_explanation_chars: usize,
    pub min_option_chars: usize,
    pub min_exam_question_chars: usize,
    pub min_exam_answer_chars: usize,
    pub max_exam_marks: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_question_chars: 20,
            max_question_chars: 500,
            min_explanation_chars: 30,
            max_explanation_chars: 1000,
            min_option_chars: 3,
            min_exam_question_chars: 30,
            min_exam_answer_chars: 20,
            max_exam_marks: 20,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityValidator {
    thresholds: QualityThresholds,
}

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

impl QualityValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn validate_quiz_question(&self, question: &QuizQuestion) -> QualityReport {
        let mut issues = Vec::new();
        self.check_question_text(&question.question_text, &mut issues);
        self.check_options(question, &mut issues);
        self.check_explanation(&question.explanation, &mut issues);

        if question.correct_answer.trim().is_empty() {
            issues.push(QualityIssue::new(Severity::Critical, "correct_answer", "Correct answer is missing"));
        }

        check_academic_language(&question.question_text, &mut issues);
        QualityReport::from_issues(issues)
    }

    pub fn validate_exam_question(&self, question: &ExamQuestion) -> QualityReport {
        let t = &self.thresholds;
        let mut issues = Vec::new();

        if char_len(&question.question_text) < t.min_exam_question_chars {
            issues.push(
                QualityIssue::new(Severity::Error, "question_text", "Exam question is too short")
                    .suggest(format!("Use at least {} characters", t.min_exam_question_chars)),
            );
        }

        if question.marks < 1 || question.marks > t.max_exam_marks {
            issues.push(QualityIssue::new(
                Severity::Error,
                "marks",
                format!("Marks must be between 1 and {}, got {}", t.max_exam_marks, question.marks),
            ));
        }

        if char_len(&question.answer_text) < t.min_exam_answer_chars {
            issues.push(
                QualityIssue::new(Severity::Error, "answer_text", "Marking scheme is too brief")
                    .suggest("List the points that earn each mark"),
            );
        }

        check_academic_language(&question.question_text, &mut issues);
        QualityReport::from_issues(issues)
    }

    /// Validate a whole paper
    ///
    /// The score is the mean question score less 0.1 per blocking issue
    /// found anywhere on the paper.
    pub fn validate_exam_paper(&self, paper: &ExamPaper) -> QualityReport {
        if paper.questions.is_empty() {
            return QualityReport {
                is_valid: false,
                quality_score: 0.0,
                issues: vec![QualityIssue::new(Severity::Critical, "questions", "Exam paper has no questions")],
            };
        }

        let mut issues = Vec::new();
        let sum = paper.marks_sum();
        if sum != paper.total_marks {
            issues.push(QualityIssue::new(
                Severity::Error,
                "total_marks",
                format!("Question marks ({}) don't match total marks ({})", sum, paper.total_marks),
            ));
        }

        let mut score_sum = 0.0;
        for (i, question) in paper.questions.iter().enumerate() {
            let report = self.validate_exam_question(question);
            score_sum += report.quality_score;
            issues.extend(report.issues.into_iter().map(|issue| QualityIssue {
                message: format!("Question {}: {}", i + 1, issue.message),
                field: format!("questions[{}].{}", i, issue.field),
                ..issue
            }));
        }

        let blocking = issues.iter().filter(|i| i.severity.is_blocking()).count();
        let average = score_sum / paper.questions.len() as f64;

        QualityReport {
            is_valid: blocking == 0,
            quality_score: (average - 0.1 * blocking as f64).max(0.0),
            issues,
        }
    }

    fn check_question_text(&self, text: &str, issues: &mut Vec<QualityIssue>) {
        let t = &self.thresholds;
        let trimmed = text.trim();

        if trimmed.is_empty() {
            issues.push(QualityIssue::new(Severity::Critical, "question_text", "Question text is empty"));
            return;
        }

        let len = char_len(trimmed);
        if len < t.min_question_chars {
            issues.push(
                QualityIssue::new(Severity::Error, "question_text", format!("Question text is too short ({} chars)", len))
                    .suggest(format!("Use at least {} characters", t.min_question_chars)),
            );
        } else if len > t.max_question_chars {
            issues.push(QualityIssue::new(
                Severity::Warning,
                "question_text",
                format!("Question text is too long ({} chars)", len),
            ));
        }

        let lower = trimmed.to_lowercase();
        if !trimmed.ends_with('?') && !INSTRUCTION_WORDS.iter().any(|w| lower.contains(w)) {
            issues.push(
                QualityIssue::new(Severity::Warning, "question_text", "Question doesn't end with a question mark")
                    .suggest("Phrase it as a question or a clear instruction"),
            );
        }

        for indicator in POOR_QUALITY_INDICATORS.iter().filter(|i| lower.contains(*i)) {
            issues.push(QualityIssue::new(
                Severity::Error,
                "question_text",
                format!("Question contains low-quality phrase '{}'", indicator),
            ));
        }
    }

    fn check_options(&self, question: &QuizQuestion, issues: &mut Vec<QualityIssue>) {
        let options = &question.options;
        if options.is_empty() {
            issues.push(QualityIssue::new(Severity::Critical, "options", "Multiple choice question has no options"));
            return;
        }

        if options.len() < OPTION_LABELS.len() {
            issues.push(QualityIssue::new(
                Severity::Error,
                "options",
                format!("Expected 4 options, got {}", options.len()),
            ));
        }

        for label in OPTION_LABELS.iter().filter(|l| !options.contains_key(**l)) {
            issues.push(QualityIssue::new(Severity::Error, "options", format!("Missing option {}", label)));
        }

        if !options.contains_key(question.correct_answer.trim()) {
            issues.push(QualityIssue::new(
                Severity::Critical,
                "correct_answer",
                format!("Correct answer '{}' is not one of the options", question.correct_answer),
            ));
        }

        let mut seen: Vec<String> = Vec::with_capacity(options.len());
        for (label, text) in options {
            let normalized = text.trim().to_lowercase();
            if seen.contains(&normalized) {
                issues.push(QualityIssue::new(
                    Severity::Error,
                    format!("options.{}", label),
                    "Duplicate option text",
                ));
            } else {
                seen.push(normalized);
            }

            if char_len(text) < self.thresholds.min_option_chars {
                issues.push(QualityIssue::new(
                    Severity::Error,
                    format!("options.{}", label),
                    format!("Option {} is too short", label),
                ));
            }
        }
    }

    fn check_explanation(&self, explanation: &str, issues: &mut Vec<QualityIssue>) {
        let t = &self.thresholds;
        let len = char_len(explanation);
        if len == 0 {
            issues.push(QualityIssue::new(Severity::Error, "explanation", "Explanation is missing"));
        } else if len < t.min_explanation_chars {
            issues.push(
                QualityIssue::new(Severity::Warning, "explanation", "Explanation is too brief")
                    .suggest("Explain why the answer is correct and the distractors are not"),
            );
        } else if len > t.max_explanation_chars {
            issues.push(QualityIssue::new(Severity::Warning, "explanation", "Explanation is too long"));
        }
    }
}

fn check_academic_language(text: &str, issues: &mut Vec<QualityIssue>) {
    let lower = text.to_lowercase();
    if !ACADEMIC_INDICATORS.iter().any(|w| lower.contains(w)) {
        issues.push(
            QualityIssue::new(Severity::Info, "question_text", "Question uses no command words")
                .suggest("Consider words like explain, describe or calculate"),
        );
    }

    if text.trim().chars().next().is_some_and(|c| !c.is_uppercase()) {
        issues.push(QualityIssue::new(
            Severity::Warning,
            "question_text",
            "Question should start with a capital letter",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(value: serde_json::Value) -> QuizQuestion {
        serde_json::from_value(value).unwrap()
    }

    fn good_question() -> QuizQuestion {
        question(json!({
            "question_text": "Explain which organelle is the site of photosynthesis in leaf cells?",
            "options": {"A": "Mitochondrion", "B": "Chloroplast", "C": "Nucleus", "D": "Ribosome"},
            "correct_answer": "B",
            "explanation": "Chloroplasts contain chlorophyll, which absorbs the light energy used to make glucose."
        }))
    }

    #[test]
    fn test_good_question_scores_full_marks() {
        let report = QualityValidator::new().validate_quiz_question(&good_question());
        assert!(report.is_valid, "{:?}", report.issues);
        assert!(report.issues.is_empty());
        assert_eq!(report.quality_score, 1.0);
    }

    #[test]
    fn test_wrong_answer_label_is_critical() {
        let mut q = good_question();
        q.correct_answer = "E".to_string();
        let report = QualityValidator::new().validate_quiz_question(&q);
        assert!(!report.is_valid);
        assert!(report.has_critical_issues());
        assert!((report.quality_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_poor_phrases_and_short_options() {
        let mut q = good_question();
        q.question_text = "Explain, maybe, which placeholder organelle makes food in leaves?".to_string();
        q.options.insert("D".to_string(), "No".to_string());
        let report = QualityValidator::new().validate_quiz_question(&q);

        assert_eq!(report.count(Severity::Error), 3);
        assert!(!report.is_valid);
        assert!((report.quality_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_missing_options_and_lowercase() {
        let q = question(json!({
            "question_text": "which gas is released?",
            "options": {},
            "correct_answer": "A",
            "explanation": "Oxygen."
        }));
        let report = QualityValidator::new().validate_quiz_question(&q);
        let severities: Vec<_> = report.issues.iter().map(|i| i.severity).collect();
        assert!(severities.contains(&Severity::Critical));
        assert!(severities.contains(&Severity::Info));
        assert!(report.issues.iter().any(|i| i.message.contains("capital letter")));
    }

    #[test]
    fn test_duplicate_options() {
        let mut q = good_question();
        q.options.insert("C".to_string(), "chloroplast ".to_string());
        let report = QualityValidator::new().validate_quiz_question(&q);
        assert!(report.issues.iter().any(|i| i.message == "Duplicate option text"));
    }

    fn exam_question(marks: u32) -> ExamQuestion {
        ExamQuestion {
            question_text: "Describe how the rate of photosynthesis changes with light intensity.".to_string(),
            marks,
            answer_text: "Rate increases with light intensity until another factor becomes limiting.".to_string(),
            explanation: String::new(),
            question_order: 1,
            question_type: "structured".to_string(),
        }
    }

    fn paper(questions: Vec<ExamQuestion>, total_marks: u32) -> ExamPaper {
        ExamPaper {
            title: "Biology".to_string(),
            instructions: "Answer ALL questions.".to_string(),
            duration_minutes: 60,
            total_marks,
            questions,
            topic_id: "t".to_string(),
            subject_name: "Biology".to_string(),
            difficulty_level: 3,
        }
    }

    #[test]
    fn test_exam_paper_scores() {
        let validator = QualityValidator::new();
        let report = validator.validate_exam_paper(&paper(vec![exam_question(5), exam_question(5)], 10));
        assert!(report.is_valid);
        assert_eq!(report.quality_score, 1.0);

        let report = validator.validate_exam_paper(&paper(vec![exam_question(5), exam_question(25)], 30));
        assert!(!report.is_valid);
        let issue = &report.issues[0];
        assert_eq!(issue.field, "questions[1].marks");
        assert!(issue.message.starts_with("Question 2: "));
        // mean of 1.0 and 0.8, less 0.1 for the one error
        assert!((report.quality_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_paper() {
        let report = QualityValidator::new().validate_exam_paper(&paper(Vec::new(), 10));
        assert_eq!(report.quality_score, 0.0);
        assert!(report.has_critical_issues());
    }

    #[test]
    fn test_paper_marks_mismatch() {
        let report = QualityValidator::new().validate_exam_paper(&paper(vec![exam_question(5)], 8));
        assert_eq!(report.issues[0].field, "total_marks");
        assert!(!report.is_valid);
    }
}
