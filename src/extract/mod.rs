//! JSON Extraction from Model Responses
//!
//! Language models wrap JSON in markdown fences, prose, and half-broken
//! syntax. This module digs the payload out: strip fences, slice to the
//! outermost brackets, and if parsing still fails, run a short ladder of
//! bounded repairs. Already-valid input always passes through untouched.

pub mod repair;

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// How many characters of the raw response an error keeps for diagnostics.
const RAW_PREVIEW_CHARS: usize = 500;

/// The top-level JSON shape a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn open(&self) -> char {
        match self {
            JsonShape::Array => '[',
            JsonShape::Object => '{',
        }
    }

    fn close(&self) -> char {
        match self {
            JsonShape::Array => ']',
            JsonShape::Object => '}',
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            JsonShape::Array => value.is_array(),
            JsonShape::Object => value.is_object(),
        }
    }
}

impl fmt::Display for JsonShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonShape::Array => f.write_str("array"),
            JsonShape::Object => f.write_str("object"),
        }
    }
}

/// Raised when no stage of the pipeline produced JSON of the expected shape.
#[derive(Debug, Clone, Error)]
#[error("expected a JSON {expected}: {message}")]
pub struct ExtractionError {
    pub expected: JsonShape,
    pub message: String,
    /// Bounded prefix of the raw response, for the error log.
    pub raw_preview: String,
}

impl ExtractionError {
    fn new(expected: JsonShape, message: impl Into<String>, raw: &str) -> Self {
        Self {
            expected,
            message: message.into(),
            raw_preview: raw.chars().take(RAW_PREVIEW_CHARS).collect(),
        }
    }
}

/// Extract a JSON value of the expected shape from a raw model response.
///
/// Stages, in order: parse the trimmed input as-is; strip markdown code
/// fences; slice from the first opening bracket to the last closing bracket;
/// parse; on failure apply each repair rung cumulatively, re-parsing after
/// every rung. Never panics and never grows the input beyond single commas.
pub fn extract_json(raw: &str, shape: JsonShape) -> Result<Value, ExtractionError> {
    let trimmed = raw.trim();
    if let Some(value) = parse_as(trimmed, shape) {
        return Ok(value);
    }

    let cleaned = strip_code_fences(trimmed);
    match slice_bracketed(&cleaned, shape) {
        Some(slice) => {
            if let Some(value) = parse_as(slice, shape) {
                return Ok(value);
            }
            let mut candidate = slice.to_string();
            for rung in repair::LADDER {
                candidate = rung.apply(&candidate);
                if let Some(value) = parse_as(&candidate, shape) {
                    tracing::debug!(rung = rung.name, "repaired malformed JSON");
                    return Ok(value);
                }
            }
            Err(ExtractionError::new(
                shape,
                "no repair strategy produced parseable JSON",
                raw,
            ))
        }
        None => parse_as(cleaned.trim(), shape).ok_or_else(|| {
            ExtractionError::new(shape, "response contains no JSON of that shape", raw)
        }),
    }
}

fn parse_as(text: &str, shape: JsonShape) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|value| shape.matches(value))
}

/// Remove markdown code-fence markers. Substring-based on purpose: the
/// payload is located by bracket slicing afterwards, so leftover backticks
/// outside the brackets are harmless.
pub fn strip_code_fences(text: &str) -> String {
    let without_open = text.replace("```json", "");
    let trimmed = without_open.trim_end();
    let without_close = trimmed.strip_suffix("```").unwrap_or(trimmed);
    without_close.trim().to_string()
}

/// Slice from the first opening bracket of the shape to its last closing
/// bracket. Returns `None` when no plausible span exists.
pub fn slice_bracketed(text: &str, shape: JsonShape) -> Option<&str> {
    let start = text.find(shape.open())?;
    let end = text.rfind(shape.close())?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_valid_array_passes_through() {
        let raw = r#"[{"name": "Django"}, {"name": "FastAPI"}]"#;
        let value = extract_json(raw, JsonShape::Array).unwrap();
        assert_eq!(value, json!([{"name": "Django"}, {"name": "FastAPI"}]));
    }

    #[test]
    fn test_extraction_is_idempotent_on_valid_json() {
        let raw = r#"{"success": true, "items": [1, 2, 3]}"#;
        let once = extract_json(raw, JsonShape::Object).unwrap();
        let twice = extract_json(&once.to_string(), JsonShape::Object).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strips_json_code_fence() {
        let raw = "```json\n{\"success\": true}\n```";
        let value = extract_json(raw, JsonShape::Object).unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[test]
    fn test_slices_array_out_of_prose() {
        let raw = "Here are your options:\n[{\"name\": \"Stack A\"}]\nLet me know!";
        let value = extract_json(raw, JsonShape::Array).unwrap();
        assert_eq!(value, json!([{"name": "Stack A"}]));
    }

    #[test]
    fn test_repairs_missing_commas_between_objects() {
        let raw = "[\n{\"name\": \"A\"}\n{\"name\": \"B\"}\n]";
        let value = extract_json(raw, JsonShape::Array).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_repairs_trailing_commas() {
        let raw = "{\"items\": [1, 2, 3,], \"done\": true,}";
        let value = extract_json(raw, JsonShape::Object).unwrap();
        assert_eq!(value, json!({"items": [1, 2, 3], "done": true}));
    }

    #[test]
    fn test_drops_prose_lines_inside_brackets() {
        let raw = "[\n{\"name\": \"A\"},\nNote that these are great options\n{\"name\": \"B\"}\n]";
        let value = extract_json(raw, JsonShape::Array).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_array_pulled_from_inside_object_when_array_expected() {
        let raw = r#"{"options": [1, 2]}"#;
        let value = extract_json(raw, JsonShape::Array).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let err = extract_json("\"just a string\"", JsonShape::Array).unwrap_err();
        assert_eq!(err.expected, JsonShape::Array);
    }

    #[test]
    fn test_garbage_reports_bounded_preview() {
        let raw = "x".repeat(2000);
        let err = extract_json(&raw, JsonShape::Object).unwrap_err();
        assert_eq!(err.raw_preview.chars().count(), 500);
    }

    #[test]
    fn test_unrepairable_payload_is_an_error() {
        let raw = "[ this is { not ] json }";
        assert!(extract_json(raw, JsonShape::Array).is_err());
    }

    #[test]
    fn test_slice_bracketed_rejects_reversed_brackets() {
        assert_eq!(slice_bracketed("] backwards [", JsonShape::Array), None);
    }
}
