//! Parse LLM output into a JSON object

use crate::error::ExtractorError;
use serde_json::{Map, Value};

/// Strip a surrounding markdown code fence, if any
///
/// Models sometimes wrap JSON in a fenced block, optionally tagged `json`.
/// When the reply starts with a fence, every leading and trailing backtick
/// is removed, then a leading `json` tag.
pub fn strip_code_fence(reply: &str) -> &str {
    let content = reply.trim();
    if !content.starts_with("```") {
        return content;
    }

    let inner = content.trim_matches('`').trim();
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
        _ => inner,
    }
}

/// Parse a model reply into a JSON object
///
/// On a syntax error the first `sample_chars` characters of the
/// fence-stripped content are kept in the error.
pub fn parse_reply(reply: &str, sample_chars: usize) -> Result<Map<String, Value>, ExtractorError> {
    let content = strip_code_fence(reply);

    let value: Value = serde_json::from_str(content).map_err(|e| ExtractorError::InvalidJson {
        message: e.to_string(),
        sample: content.chars().take(sample_chars).collect(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ExtractorError::UnexpectedShape(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
