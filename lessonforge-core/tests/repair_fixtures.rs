//! Golden fixtures of malformed model output seen from real vendors
//!
//! Each case pins the repaired value and the stage that produced it. Add a
//! case here whenever a new vendor failure mode turns up.

use lessonforge_core::repair::{repair, repair_text, JsonRepairPipeline, RepairStage};
use serde_json::{json, Value};
use test_case::test_case;

#[test_case(
    "Sure! Here are your flashcards:\n```json\n{\"flashcards\": [{\"front_content\": \"Osmosis\", \"back_content\": \"Water diffusion\"}]}\n```\nLet me know if you need more.",
    json!({"flashcards": [{"front_content": "Osmosis", "back_content": "Water diffusion"}]}),
    RepairStage::Extract ;
    "chatty preamble and code fence"
)]
#[test_case(
    "\u{feff}{\"title\": \"Cells\"}",
    json!({"title": "Cells"}),
    RepairStage::Extract ;
    "byte order mark"
)]
#[test_case(
    "[{\"question_text\": \"Q1\"}] I hope these questions help!",
    json!([{"question_text": "Q1"}]),
    RepairStage::Extract ;
    "trailing prose after array"
)]
#[test_case(
    r#"{"flashcards": [{"front_content": "Q1", "back_content": "A1"}, {"front_content": "Q2", "back"#,
    json!({"flashcards": [{"front_content": "Q1", "back_content": "A1"}, {"front_content": "Q2"}]}),
    RepairStage::Truncation ;
    "truncated inside a key"
)]
#[test_case(
    r#"{"questions": [{"question_text": "Define diffusion", "explanation": "Net movement of particles from high to low concentr"#,
    json!({"questions": [{"question_text": "Define diffusion", "explanation": "Net movement of particles from high to low concentr"}]}),
    RepairStage::Truncation ;
    "truncated inside a value string"
)]
#[test_case(
    r#"{"marks": [2, 5, 10,"#,
    json!({"marks": [2, 5, 10]}),
    RepairStage::Truncation ;
    "truncated after a comma"
)]
#[test_case(
    r#"{"question_text": "He said "hi" loudly", "points": 1}"#,
    json!({"question_text": "He said \"hi\" loudly", "points": 1}),
    RepairStage::QuoteComma ;
    "unescaped inner quotes"
)]
#[test_case(
    r#"{"description": "Photosynthesis converts light", "which plants use for energy", "level": 2}"#,
    json!({"description": "Photosynthesis converts light, which plants use for energy", "level": 2}),
    RepairStage::QuoteComma ;
    "value split at a comma"
)]
#[test_case(
    r#"{front_content": "Mitosis", back_content": "Division into two cells"}"#,
    json!({"front_content": "Mitosis", "back_content": "Division into two cells"}),
    RepairStage::QuoteComma ;
    "keys missing their opening quote"
)]
#[test_case(
    r#"{"a": 1,}"#,
    json!({"a": 1}),
    RepairStage::Structural ;
    "trailing comma before brace"
)]
#[test_case(
    "{\"back_content\": \"line one\nline two\"}",
    json!({"back_content": "line one\nline two"}),
    RepairStage::Structural ;
    "raw newline inside string"
)]
#[test_case(
    r#"{"a": "say "hi" now", "b": [1, 2"#,
    json!({"a": "say \"hi\" now", "b": [1, 2]}),
    RepairStage::Structural ;
    "inner quotes and truncation together"
)]
fn test_golden_fixture(raw: &str, expected: Value, stage: RepairStage) {
    let outcome = repair(raw);
    assert_eq!(outcome.value, expected, "raw: {}", raw);
    assert_eq!(outcome.stage, stage, "raw: {}", raw);
}

#[test]
fn test_capitalized_second_string_is_not_merged() {
    let raw = r#"{"tags": "Biology", "Chemistry", "level": 2}"#;
    let outcome = repair(raw);

    assert_eq!(outcome.stage, RepairStage::Fallback);
    assert!(!outcome.value.to_string().contains("Biology, Chemistry"));
}

#[test]
fn test_trailing_comma_scenario() {
    let raw = r#"{"flashcards": [{"front_content": "Q1", "back_content": "A1"},], "count": 1,}"#;
    let outcome = repair(raw);

    assert!(!outcome.is_fallback());
    assert_eq!(
        outcome.value,
        json!({"flashcards": [{"front_content": "Q1", "back_content": "A1"}], "count": 1})
    );
}

#[test_case("" ; "empty")]
#[test_case("I'm sorry, but I can't create that content." ; "refusal")]
#[test_case("```\n```" ; "empty fence")]
#[test_case("}}]]" ; "only closers")]
fn test_unrepairable_input_falls_back(raw: &str) {
    let outcome = repair(raw);
    assert_eq!(outcome.stage, RepairStage::Fallback);
    assert_eq!(outcome.value["error"], "Failed to parse generated JSON");
    assert!(outcome.value.get("parseError").is_some());
    assert!(repair_text(raw).is_none());
}

#[test]
fn test_fallback_preview_is_capped() {
    let raw = "x".repeat(500);
    let outcome = JsonRepairPipeline::new().repair(&raw);
    assert_eq!(outcome.value["rawResponsePreview"].as_str().unwrap().len(), 200);
}

#[test]
fn test_attempts_record_each_distinct_stage() {
    let outcome = repair(r#"{"a": 1,}"#);
    let stages: Vec<_> = outcome.attempts.iter().map(|a| a.stage).collect();
    assert_eq!(stages.first(), Some(&RepairStage::Direct));
    assert_eq!(stages.last(), Some(&RepairStage::Structural));
}
