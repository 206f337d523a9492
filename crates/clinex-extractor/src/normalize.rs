//! Normalization of a parsed model reply into a `ClinicalRecord`
//!
//! Every field is read through a typed accessor. A missing field or a field
//! of the wrong type falls back to that field's default instead of failing
//! the request, and malformed list entries are dropped one by one.

use clinex_domain::{ClinicalRecord, Diagnosis, Medication};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

type Object = Map<String, Value>;

/// One or more bracketed uppercase tokens, e.g. `[PATIENT]` or `[NAME] [NAME]`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[[A-Z]+\]\s*)+$").expect("placeholder pattern compiles")
});

/// Build a record from a parsed reply without modifying it
pub fn normalize(data: &Object) -> ClinicalRecord {
    ClinicalRecord {
        name: null_if_placeholder(str_field(data, "name")),
        age: data.get("age").cloned().unwrap_or(Value::Null),
        mental_illnesses: mental_illnesses(array_field(data, "mental_illnesses")),
        medications_taken: medications(array_field(data, "medications_taken")),
        past_history: collapse_whitespace(str_field(data, "past_history").unwrap_or_default()),
        diagnoses: diagnoses(array_field(data, "diagnoses")),
    }
}

/// Trim a name, mapping empty values and redaction placeholders to `None`
///
/// A name made only of whitespace is not empty, so it comes back as `""`.
pub fn null_if_placeholder(value: Option<&str>) -> Option<String> {
    let value = value.filter(|s| !s.is_empty())?;
    let trimmed = value.trim();
    if PLACEHOLDER.is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Uppercase the first character and leave the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trim and replace every run of whitespace with a single space
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn str_field<'a>(obj: &'a Object, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn array_field<'a>(obj: &'a Object, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Any field value, with empty values treated as absent
fn optional_value(obj: &Object, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !is_empty_value(v)).cloned()
}

/// Null, `false`, zero, and empty strings, arrays and objects
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// A trimmed, non-empty string field
fn required_text<'a>(obj: &'a Object, key: &str) -> Option<&'a str> {
    str_field(obj, key).map(str::trim).filter(|s| !s.is_empty())
}

fn mental_illnesses(entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect()
}

fn medications(entries: &[Value]) -> Vec<Medication> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let Some(obj) = entry.as_object() else {
                debug!("Dropping medication {}: not an object", idx);
                return None;
            };
            let Some(name) = required_text(obj, "name") else {
                debug!("Dropping medication {}: missing name", idx);
                return None;
            };
            Some(Medication {
                name: name.to_lowercase(),
                dose: optional_value(obj, "dose"),
                route: optional_value(obj, "route"),
                frequency: optional_value(obj, "frequency"),
                duration: optional_value(obj, "duration"),
                reason: optional_value(obj, "reason"),
            })
        })
        .collect()
}

fn diagnoses(entries: &[Value]) -> Vec<Diagnosis> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let Some(obj) = entry.as_object() else {
                debug!("Dropping diagnosis {}: not an object", idx);
                return None;
            };
            let Some(label) = required_text(obj, "label") else {
                debug!("Dropping diagnosis {}: missing label", idx);
                return None;
            };
            Some(Diagnosis {
                label: capitalize_first(label),
                code: optional_value(obj, "code"),
                priority: optional_value(obj, "priority"),
            })
        })
        .collect()
}
