//! JSON repair pipeline for model output
//!
//! Model responses that should be a single JSON document arrive wrapped in
//! prose, cut off at the token limit, or broken in a handful of recurring
//! ways. [`JsonRepairPipeline`] runs an ordered list of pure string stages,
//! parsing after each, and stops at the first success:
//!
//! 1. direct parse of the untouched text;
//! 2. extraction from code fences and surrounding prose;
//! 3. closing of a truncated document;
//! 4. quote and comma repairs;
//! 5. structural cleanup (trailing commas, control characters, brackets).
//!
//! When nothing parses, a fallback object carrying an `error` key is
//! synthesized instead. The pipeline never fails and never panics.

mod extract;
mod quotes;
mod scan;
mod structure;
mod truncation;

pub use extract::extract_json;
pub use quotes::fix_quotes_and_commas;
pub use structure::fix_structure;
pub use truncation::close_truncated;

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, warn};

/// Error marker carried by fallback objects
pub const FALLBACK_ERROR: &str = "Failed to parse generated JSON";

/// Default number of characters kept in a fallback preview
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Repair stage, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStage {
    Direct,
    Extract,
    Truncation,
    QuoteComma,
    Structural,
    Fallback,
}

impl RepairStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStage::Direct => "direct",
            RepairStage::Extract => "extract",
            RepairStage::Truncation => "truncation",
            RepairStage::QuoteComma => "quote_comma",
            RepairStage::Structural => "structural",
            RepairStage::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RepairStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairAttempt {
    pub stage: RepairStage,
    pub text: String,
}

/// Result of running the pipeline
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Parsed value, or the fallback object
    pub value: Value,
    /// Stage that produced `value`
    pub stage: RepairStage,
    /// Every distinct text that was tried, in order
    pub attempts: Vec<RepairAttempt>,
    /// Parse error of the untouched input, if it did not parse
    pub parse_error: Option<String>,
}

impl RepairOutcome {
    pub fn is_fallback(&self) -> bool {
        self.stage == RepairStage::Fallback
    }

    /// The text that parsed, `None` for a fallback
    pub fn repaired_text(&self) -> Option<&str> {
        if self.is_fallback() {
            return None;
        }
        self.attempts.last().map(|attempt| attempt.text.as_str())
    }
}

/// Ordered repair stages with a parse attempt after each
#[derive(Debug, Clone)]
pub struct JsonRepairPipeline {
    preview_chars: usize,
}

impl Default for JsonRepairPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairPipeline {
    pub fn new() -> Self {
        Self {
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Set how many characters of raw text a fallback preview keeps
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Repair `raw` into a JSON value, or synthesize a fallback object
    pub fn repair(&self, raw: &str) -> RepairOutcome {
        let mut attempts = vec![RepairAttempt {
            stage: RepairStage::Direct,
            text: raw.to_string(),
        }];

        let parse_error = match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                return RepairOutcome {
                    value,
                    stage: RepairStage::Direct,
                    attempts,
                    parse_error: None,
                }
            }
            Err(e) => e.to_string(),
        };
        debug!(error = %parse_error, len = raw.len(), "direct parse failed, repairing");

        let extracted = extract_json(raw);
        // Quote repairs restart from the extracted text since closers
        // appended behind an unescaped quote would land inside a string.
        let mut quoted = String::new();
        let stages = [
            RepairStage::Extract,
            RepairStage::Truncation,
            RepairStage::QuoteComma,
            RepairStage::Structural,
        ];

        for stage in stages {
            let text = match stage {
                RepairStage::Extract => extracted.clone(),
                RepairStage::Truncation => close_truncated(&extracted),
                RepairStage::QuoteComma => {
                    quoted = fix_quotes_and_commas(&extracted);
                    quoted.clone()
                }
                _ => fix_structure(&quoted),
            };
            if attempts.iter().any(|attempt| attempt.text == text) {
                continue;
            }

            let parsed = serde_json::from_str::<Value>(&text);
            attempts.push(RepairAttempt { stage, text });

            if let Ok(value) = parsed {
                debug!(stage = %stage, "repaired JSON");
                return RepairOutcome {
                    value,
                    stage,
                    attempts,
                    parse_error: Some(parse_error),
                };
            }
        }

        warn!(
            error = %parse_error,
            stages_tried = attempts.len(),
            "could not repair generated JSON, returning fallback"
        );
        RepairOutcome {
            value: self.fallback(raw, &parse_error),
            stage: RepairStage::Fallback,
            attempts,
            parse_error: Some(parse_error),
        }
    }

    /// The repaired text when repair succeeds
    pub fn repair_text(&self, raw: &str) -> Option<String> {
        self.repair(raw).repaired_text().map(str::to_string)
    }

    fn fallback(&self, raw: &str, parse_error: &str) -> Value {
        json!({
            "error": FALLBACK_ERROR,
            "parseError": parse_error,
            "rawResponsePreview": preview(raw, self.preview_chars),
        })
    }
}

/// Repair `raw` with the default pipeline
pub fn repair(raw: &str) -> RepairOutcome {
    JsonRepairPipeline::new().repair(raw)
}

/// Textual output of a successful repair with the default pipeline
pub fn repair_text(raw: &str) -> Option<String> {
    JsonRepairPipeline::new().repair_text(raw)
}

/// The first `max_chars` characters of `text`
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_short_circuits() {
        let outcome = repair(r#"{"a": [1, 2]}"#);
        assert_eq!(outcome.stage, RepairStage::Direct);
        assert_eq!(outcome.value, json!({"a": [1, 2]}));
        assert!(outcome.parse_error.is_none());
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[test]
    fn test_stage_reported() {
        assert_eq!(repair("```json\n{\"a\": 1}\n```").stage, RepairStage::Extract);
        assert_eq!(repair(r#"{"a": [1, 2"#).stage, RepairStage::Truncation);
        assert_eq!(repair(r#"{"a": "say "hi" now"}"#).stage, RepairStage::QuoteComma);
        assert_eq!(repair(r#"{"a": 1,}"#).stage, RepairStage::Structural);
    }

    #[test]
    fn test_quote_fix_then_truncation() {
        let outcome = repair(r#"{"a": "say "hi" now", "b": [1, 2"#);
        assert_eq!(outcome.stage, RepairStage::Structural);
        assert_eq!(outcome.value, json!({"a": "say \"hi\" now", "b": [1, 2]}));
    }

    #[test]
    fn test_fallback_shape() {
        let raw = "I'm sorry, I can't help with that.";
        let outcome = JsonRepairPipeline::new().with_preview_chars(10).repair(raw);

        assert!(outcome.is_fallback());
        assert!(outcome.repaired_text().is_none());
        assert_eq!(outcome.value["error"], FALLBACK_ERROR);
        assert_eq!(outcome.value["rawResponsePreview"], "I'm sorry,");
        assert!(outcome.value["parseError"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_empty_input_falls_back() {
        let outcome = repair("");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.value["rawResponsePreview"], "");
    }

    #[test]
    fn test_repair_text_is_idempotent() {
        let text = repair_text(r#"Here: {"a": [1, 2,"#).unwrap();
        let again = repair(&text);
        assert_eq!(again.stage, RepairStage::Direct);
        assert_eq!(again.value, repair(r#"Here: {"a": [1, 2,"#).value);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("héllo wörld", 4), "héll");
    }
}
