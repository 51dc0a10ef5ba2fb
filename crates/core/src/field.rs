//! Closed field-value model for lead brief data
//!
//! Lead submissions carry arbitrary key/value data. Instead of passing raw
//! JSON around, every value is narrowed to a small closed set of shapes and
//! the "is this field empty" question is answered in exactly one place
//! ([`FieldValue::is_empty`]), reused by the required-field resolver and the
//! completeness scorer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single lead field value.
///
/// Numbers are carried as text: the intake boundary has no numeric
/// semantics, and `0` must remain a present value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    #[default]
    Absent,
}

impl FieldValue {
    /// Convert a raw JSON value into the closed set.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Absent,
            Value::Bool(b) => FieldValue::Flag(*b),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Object(map) if map.is_empty() => FieldValue::Absent,
            Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }

    /// The single emptiness predicate.
    ///
    /// Empty: absent, whitespace-only text, a list with no non-blank entry.
    /// Never empty: flags (an explicit `false` is a present answer) and any
    /// other non-blank text, including `"0"`.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            FieldValue::Flag(_) => false,
        }
    }

    /// Text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as an explicit yes (consent checkbox semantics).
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "oui")
            }
            _ => false,
        }
    }

    /// Render back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Flag(b) => Value::Bool(*b),
            FieldValue::Absent => Value::Null,
        }
    }
}

static ABSENT: FieldValue = FieldValue::Absent;

/// The full key/value data of one lead submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFields(BTreeMap<String, FieldValue>);

impl LeadFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, narrowing each value.
    pub fn from_json_map(map: &serde_json::Map<String, Value>) -> Self {
        Self(
            map.iter()
                .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                .collect(),
        )
    }

    /// Look up a field; missing keys read as [`FieldValue::Absent`].
    pub fn get(&self, key: &str) -> &FieldValue {
        self.0.get(key).unwrap_or(&ABSENT)
    }

    /// Text content of a field, if present.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).as_text()
    }

    /// True when the field is empty per the single predicate.
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).is_empty()
    }

    /// True when the field is an explicit yes.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_truthy()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render back to a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for LeadFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LeadFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Object(map) => Ok(LeadFields::from_json_map(&map)),
            other => Err(serde::de::Error::custom(format!(
                "lead fields must be a JSON object, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_text_is_empty() {
        assert!(FieldValue::Text("   ".to_string()).is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(!FieldValue::Text("x".to_string()).is_empty());
    }

    #[test]
    fn test_zero_is_not_empty() {
        assert!(!FieldValue::from_json(&json!(0)).is_empty());
        assert!(!FieldValue::from_json(&json!("0")).is_empty());
    }

    #[test]
    fn test_flag_is_never_empty() {
        assert!(!FieldValue::Flag(false).is_empty());
        assert!(!FieldValue::Flag(true).is_empty());
    }

    #[test]
    fn test_empty_containers_are_empty() {
        assert!(FieldValue::from_json(&json!([])).is_empty());
        assert!(FieldValue::from_json(&json!({})).is_empty());
        assert!(FieldValue::from_json(&json!(null)).is_empty());
        assert!(FieldValue::from_json(&json!(["", "  "])).is_empty());
        assert!(!FieldValue::from_json(&json!(["a"])).is_empty());
    }

    #[test]
    fn test_truthy() {
        assert!(FieldValue::Flag(true).is_truthy());
        assert!(!FieldValue::Flag(false).is_truthy());
        assert!(FieldValue::Text("oui".to_string()).is_truthy());
        assert!(FieldValue::Text("1".to_string()).is_truthy());
        assert!(!FieldValue::Text("non".to_string()).is_truthy());
        assert!(!FieldValue::Absent.is_truthy());
    }

    #[test]
    fn test_fields_round_trip() {
        let map = json!({
            "full_name": "Ama K.",
            "consent": true,
            "projects": ["site", "app"],
            "budget": 0,
        });
        let fields = LeadFields::from_json_map(map.as_object().unwrap());
        assert_eq!(fields.text("full_name"), Some("Ama K."));
        assert!(fields.is_truthy("consent"));
        assert!(!fields.is_blank("budget"));
        assert!(fields.is_blank("missing_key"));

        let back: LeadFields =
            serde_json::from_value(serde_json::to_value(&fields).unwrap()).unwrap();
        assert_eq!(back, fields);
    }
}
