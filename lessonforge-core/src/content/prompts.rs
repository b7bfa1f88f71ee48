//! Prompt builders for flashcards, quizzes and exam papers

use super::TopicInfo;
use serde::Serialize;
use std::fmt::Write;

/// System prompt used for content generation unless the caller sets one
pub const EDUCATOR_SYSTEM_PROMPT: &str = "You are an expert IGCSE educator. Respond with valid JSON only.";

/// A group of exam questions sharing a mark value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkBand {
    pub marks: u32,
    pub count: u32,
    #[serde(rename = "type")]
    pub question_type: &'static str,
}

impl MarkBand {
    const fn new(marks: u32, count: u32, question_type: &'static str) -> Self {
        Self { marks, count, question_type }
    }

    pub fn total(&self) -> u32 {
        self.marks * self.count
    }
}

const SHORT_PAPER: [MarkBand; 2] = [MarkBand::new(2, 5, "short_answer"), MarkBand::new(5, 2, "structured")];

const FULL_PAPER: [MarkBand; 3] = [
    MarkBand::new(2, 5, "short_answer"),
    MarkBand::new(5, 4, "structured"),
    MarkBand::new(10, 2, "extended"),
];

/// Question layout requested for a paper worth `total_marks`
///
/// 20-mark papers are short; everything else uses the 50-mark layout.
pub fn exam_distribution(total_marks: u32) -> &'static [MarkBand] {
    if total_marks == 20 {
        &SHORT_PAPER
    } else {
        &FULL_PAPER
    }
}

/// Suggested duration for a paper worth `total_marks`
pub fn exam_duration_minutes(total_marks: u32) -> u32 {
    if total_marks <= 20 {
        60
    } else {
        90
    }
}

fn topic_header(out: &mut String, topic: &TopicInfo) {
    let _ = writeln!(out, "Topic: {}", topic.title);
    let _ = writeln!(out, "Subject: {}", topic.subject_name);
    let _ = writeln!(out, "Difficulty Level: {}/5", topic.difficulty_level);
    if !topic.syllabus_code.is_empty() {
        let _ = writeln!(out, "Syllabus Code: {}", topic.syllabus_code);
    }
    if !topic.description.is_empty() {
        let _ = writeln!(out, "Description: {}", topic.description);
    }
    if !topic.learning_objectives.is_empty() {
        out.push_str("Learning Objectives:\n");
        for objective in &topic.learning_objectives {
            let _ = writeln!(out, "- {}", objective);
        }
    }
    out.push('\n');
}

pub fn flashcard_prompt(topic: &TopicInfo, count: u32) -> String {
    let mut out = format!(
        "You are an expert IGCSE {} educator writing revision flashcards for Grade 9-10 students.\n\n",
        topic.subject_name
    );
    topic_header(&mut out, topic);
    let _ = write!(
        out,
        "Create {count} flashcards covering the key facts, definitions and processes in {title}.\n\
         Keep the front short (a term or a question) and the back a precise answer of one to three sentences.\n\n\
         Respond with valid JSON only:\n\
         {{\n  \"flashcards\": [\n    {{\n      \"front_content\": \"Term or question\",\n      \"back_content\": \"Definition or answer\",\n      \"hint\": \"Optional memory aid\"\n    }}\n  ]\n}}\n",
        count = count,
        title = topic.title
    );
    out
}

pub fn quiz_prompt(topic: &TopicInfo, count: u32) -> String {
    let mut out = format!(
        "You are an expert IGCSE {} educator creating quiz questions for Grade 9-10 students.\n\n",
        topic.subject_name
    );
    topic_header(&mut out, topic);
    let _ = write!(
        out,
        "Create {count} multiple choice questions that:\n\
         1. Test understanding of key concepts in {title}\n\
         2. Are pitched at IGCSE Grade 9-10 level\n\
         3. Have 4 distinct options labelled A, B, C and D\n\
         4. Explain why the correct answer is right and the others are wrong\n\
         5. Use proper academic terminology\n\n\
         Respond with valid JSON only:\n\
         {{\n  \"questions\": [\n    {{\n      \"question_text\": \"Question text\",\n      \"question_type\": \"multiple_choice\",\n      \"options\": {{\"A\": \"...\", \"B\": \"...\", \"C\": \"...\", \"D\": \"...\"}},\n      \"correct_answer\": \"A\",\n      \"explanation\": \"Why A is correct\",\n      \"difficulty_level\": {level},\n      \"points\": 1,\n      \"tags\": [\"tag\"]\n    }}\n  ]\n}}\n",
        count = count,
        title = topic.title,
        level = topic.difficulty_level
    );
    out
}

pub fn exam_prompt(topic: &TopicInfo, total_marks: u32) -> String {
    let mut out = format!(
        "You are an expert IGCSE {} examiner creating a formal exam paper.\n\n",
        topic.subject_name
    );
    topic_header(&mut out, topic);
    let _ = writeln!(out, "Total Marks: {}\n", total_marks);

    out.push_str("Create exam questions with this distribution:\n");
    for band in exam_distribution(total_marks) {
        let _ = writeln!(
            out,
            "- {} {} question(s) worth {} marks each",
            band.count, band.question_type, band.marks
        );
    }

    let _ = write!(
        out,
        "\nInclude a marking scheme or model answer for every question, cover different aspects of {title}, \
         and test knowledge, understanding, application and analysis.\n\n\
         Respond with valid JSON only:\n\
         {{\n  \"title\": \"IGCSE {subject}: {title}\",\n  \"instructions\": \"Answer ALL questions. Show all working clearly.\",\n  \"duration_minutes\": {duration},\n  \"total_marks\": {total_marks},\n  \"questions\": [\n    {{\n      \"question_text\": \"Question text\",\n      \"marks\": 5,\n      \"answer_text\": \"Marking scheme\",\n      \"explanation\": \"Guidance for markers\",\n      \"question_order\": 1,\n      \"question_type\": \"structured\"\n    }}\n  ]\n}}\n",
        title = topic.title,
        subject = topic.subject_name,
        duration = exam_duration_minutes(total_marks),
        total_marks = total_marks
    );
    out
}
