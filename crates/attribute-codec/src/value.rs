//! Domain values and configuration records

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A domain-level field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Raw integer counts (intervals, flags)
    Integer(i64),
    /// Scaled physical quantities
    Number(f64),
    /// On/off flags
    Bool(bool),
}

impl FieldValue {
    /// Interpret a host-supplied JSON value
    ///
    /// Numeric strings are accepted; anything else that is not a number or
    /// boolean yields `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .or_else(|| n.as_f64().map(FieldValue::Number)),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(FieldValue::Integer)
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(FieldValue::Number))
            }
            _ => None,
        }
    }

    /// Numeric view; booleans have none
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Number(v) => Some(*v),
            FieldValue::Bool(_) => None,
        }
    }

    /// Truthiness as the host evaluates it: nonzero numbers and `true`
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Integer(v) => *v != 0,
            FieldValue::Number(v) => *v != 0.0 && !v.is_nan(),
            FieldValue::Bool(b) => *b,
        }
    }

    /// Truthiness of an arbitrary host JSON value
    ///
    /// `null`, `false`, `0`, `NaN` and `""` are false; everything else,
    /// including the string `"false"`, is true.
    #[must_use]
    pub fn json_truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Integer(v) => Value::from(*v),
            FieldValue::Number(v) => Value::from(*v),
            FieldValue::Bool(b) => Value::from(*b),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Round to the nearest integer with halves toward positive infinity
///
/// This is the host runtime's `Math.round`: `0.5 -> 1`, `-0.5 -> 0`,
/// `-2.5 -> -2`.
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    // f64::round breaks ties away from zero, which is wrong for negative halves
    let rounded = x.round();
    if x - rounded == 0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Domain-level configuration: field name to value
///
/// Keeps insertion order, which for decoded records is table order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, FieldValue>")]
pub struct ConfigRecord {
    entries: Vec<(String, FieldValue)>,
}

impl ConfigRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value in place
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flat JSON object suitable for merging into published device state
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, FieldValue>> for ConfigRecord {
    fn from(map: BTreeMap<String, FieldValue>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, FieldValue)> for ConfigRecord {
    fn from_iter<I: IntoIterator<Item = (S, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for ConfigRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-0.6), -1.0);
        assert_eq!(round_half_up(123.0), 123.0);
        assert_eq!(round_half_up(-100.49999999999999), -100.0);
    }

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(FieldValue::from_json(&json!(30)), Some(FieldValue::Integer(30)));
        assert_eq!(FieldValue::from_json(&json!(1.25)), Some(FieldValue::Number(1.25)));
        assert_eq!(FieldValue::from_json(&json!(true)), Some(FieldValue::Bool(true)));
        assert_eq!(FieldValue::from_json(&json!(" -1.5 ")), Some(FieldValue::Number(-1.5)));
        assert_eq!(FieldValue::from_json(&json!("abc")), None);
        assert_eq!(FieldValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_json_truthiness() {
        assert!(!FieldValue::json_truthy(&json!(null)));
        assert!(!FieldValue::json_truthy(&json!(0)));
        assert!(!FieldValue::json_truthy(&json!("")));
        assert!(FieldValue::json_truthy(&json!("false")));
        assert!(FieldValue::json_truthy(&json!("OFF")));
        assert!(FieldValue::json_truthy(&json!(-0.5)));
        assert!(FieldValue::json_truthy(&json!([])));
    }

    #[test]
    fn test_truthiness() {
        assert!(FieldValue::Integer(2).is_truthy());
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(!FieldValue::Number(f64::NAN).is_truthy());
        assert!(FieldValue::Bool(true).is_truthy());
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = ConfigRecord::new();
        record.insert("b", FieldValue::Integer(1));
        record.insert("a", FieldValue::Integer(2));
        record.insert("b", FieldValue::Integer(3));

        let names: Vec<_> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(record.get("b"), Some(&FieldValue::Integer(3)));
    }

    #[test]
    fn test_record_json() {
        let record: ConfigRecord = [
            ("sensor_read_interval", FieldValue::Integer(30)),
            ("temperature_offset", FieldValue::Number(-1.5)),
            ("led_enable", FieldValue::Bool(false)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"sensor_read_interval": 30, "temperature_offset": -1.5, "led_enable": false})
        );
        assert_eq!(record.to_json(), serde_json::to_value(&record).unwrap());

        let parsed: ConfigRecord =
            serde_json::from_str(r#"{"led_enable": true, "humidity_offset": 2}"#).unwrap();
        assert_eq!(parsed.get("led_enable"), Some(&FieldValue::Bool(true)));
        assert_eq!(parsed.get("humidity_offset"), Some(&FieldValue::Integer(2)));
    }
}
