//! InfluxDB line protocol: `measurement,tag=v field=v timestamp`

use chrono::{DateTime, Utc};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, FieldValue)>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Escape `chars` (and backslash) with a backslash. Line breaks end a point,
/// so they become spaces before escaping.
fn escape(raw: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if matches!(c, '\n' | '\r') { ' ' } else { c };
        if c == '\\' || chars.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_key(raw: &str) -> String {
    escape(raw, &[',', '=', ' '])
}

impl LinePoint {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.push((key.to_string(), value.into()));
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Serialize to one protocol line.
    ///
    /// Empty tag values and non-finite floats cannot be represented and are
    /// dropped. Returns `None` when no field survives.
    pub fn to_line(&self) -> Option<String> {
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            let rendered = match value {
                FieldValue::Float(v) if !v.is_finite() => {
                    tracing::debug!(
                        "Dropping non-finite field {}.{} = {}",
                        self.measurement,
                        key,
                        v
                    );
                    continue;
                }
                FieldValue::Float(v) => format!("{}", v),
                FieldValue::Integer(v) => format!("{}i", v),
                FieldValue::Text(v) => format!("\"{}\"", escape(v, &['"'])),
            };
            fields.push(format!("{}={}", escape_key(key), rendered));
        }
        if fields.is_empty() {
            return None;
        }

        line.push(' ');
        line.push_str(&fields.join(","));
        if let Some(nanos) = self.timestamp.and_then(|t| t.timestamp_nanos_opt()) {
            let _ = write!(line, " {}", nanos);
        }
        Some(line)
    }
}
