//! Subject records — the structured business data of the simulated subject.
//!
//! A record is a flat key → value map supplied whole by the data-source
//! browser (out of scope) and read-only to the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key → value business data for the active simulated subject.
///
/// Values are scalars, lists, or nested objects; list/object fields are
/// often carried as pre-rendered text blobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectRecord {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl SubjectRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a field as text. String values are returned verbatim;
    /// structured values are rendered as compact JSON; missing fields
    /// yield an empty string.
    pub fn get_text(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => String::new(),
        }
    }
}

/// Parse a monetary amount from formatted text.
///
/// Tolerates thousands separators and trailing unit glyphs
/// ("1,234,567.89元" → 1234567.89). Unparseable input yields 0.0 —
/// computation proceeds rather than failing the turn.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}
