//! The normalized clinical record
//!
//! A `ClinicalRecord` is built once per uploaded note and returned to the
//! caller as JSON. It is never stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured fields pulled from one clinical note
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClinicalRecord {
    /// Patient name, or `None` when absent or redacted
    pub name: Option<String>,

    /// Age exactly as the model reported it
    #[serde(default)]
    pub age: Value,

    /// Mental illnesses, first letter capitalized
    #[serde(default)]
    pub mental_illnesses: Vec<String>,

    /// Medications the patient takes
    #[serde(default)]
    pub medications_taken: Vec<Medication>,

    /// Past history with whitespace collapsed
    #[serde(default)]
    pub past_history: String,

    /// Diagnoses with optional code and priority
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
}

/// A medication entry
///
/// Optional fields hold whatever non-empty value the model reported, so a
/// numeric dose such as `300` survives alongside `"300 mg"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    /// Lowercased drug name, never empty
    pub name: String,
    /// Dose, e.g. "50 mg"
    pub dose: Option<Value>,
    /// Route, e.g. "oral"
    pub route: Option<Value>,
    /// Frequency, e.g. "daily"
    pub frequency: Option<Value>,
    /// Duration, e.g. "6 weeks"
    pub duration: Option<Value>,
    /// Reason for taking it
    pub reason: Option<Value>,
}

impl Medication {
    /// Create a medication with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dose: None,
            route: None,
            frequency: None,
            duration: None,
            reason: None,
        }
    }
}

/// A diagnosis entry
///
/// `priority` is expected to be one of high/medium/low but is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Diagnosis label, first letter capitalized
    pub label: String,
    /// ICD/DSM code if present, string or numeric
    pub code: Option<Value>,
    /// Priority as reported by the model
    pub priority: Option<Value>,
}
