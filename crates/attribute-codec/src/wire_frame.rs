//! Inbound attribute frames, normalized to integer keys

use crate::value::round_half_up;
use serde_json::Value;
use std::collections::BTreeMap;
use zcl_wire::ReportedAttribute;

/// An attribute key as the host delivered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKey {
    /// Integer-typed key
    Numeric(i64),
    /// String-typed key, decimal or `0x` hexadecimal
    Text(String),
}

impl FrameKey {
    /// Resolve to an attribute ID; `None` for malformed or out-of-range keys
    #[must_use]
    pub fn attribute_id(&self) -> Option<u16> {
        match self {
            FrameKey::Numeric(id) => u16::try_from(*id).ok(),
            FrameKey::Text(text) => {
                let text = text.trim();
                match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u16::from_str_radix(hex, 16).ok(),
                    None => text.parse::<u16>().ok(),
                }
            }
        }
    }
}

/// Attribute ID to raw value, as received in one report or read response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireFrame {
    values: BTreeMap<u16, i64>,
}

impl WireFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize host entries to integer keys
    ///
    /// When both the numeric and the textual form of an ID are present, the
    /// numeric entry wins. Malformed keys are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = (FrameKey, i64)>) -> Self {
        let mut values = BTreeMap::new();
        let mut textual = Vec::new();

        for (key, raw) in entries {
            let Some(id) = key.attribute_id() else {
                tracing::trace!("Dropping malformed attribute key {:?}", key);
                continue;
            };
            match key {
                FrameKey::Numeric(_) => {
                    values.insert(id, raw);
                }
                FrameKey::Text(_) => textual.push((id, raw)),
            }
        }

        for (id, raw) in textual {
            values.entry(id).or_insert(raw);
        }

        Self { values }
    }

    /// Normalize a host `data` object (string keys, JSON values)
    ///
    /// Booleans become `1`/`0`, fractional numbers are rounded, and any other
    /// value is treated as absent. A non-object yields an empty frame.
    #[must_use]
    pub fn from_json(data: &Value) -> Self {
        let Some(object) = data.as_object() else {
            return Self::new();
        };

        Self::from_entries(object.iter().filter_map(|(key, value)| {
            let raw = match value {
                Value::Number(n) => n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|v| v.is_finite())
                        .map(|v| round_half_up(v) as i64)
                }),
                Value::Bool(b) => Some(i64::from(*b)),
                _ => None,
            };
            if raw.is_none() {
                tracing::trace!("Ignoring non-numeric value for attribute key {}", key);
            }
            raw.map(|raw| (FrameKey::Text(key.clone()), raw))
        }))
    }

    /// Collect integer-valued attributes from a parsed ZCL payload
    #[must_use]
    pub fn from_reported(attributes: &[ReportedAttribute]) -> Self {
        attributes
            .iter()
            .filter_map(|a| a.value.as_integer().map(|raw| (a.attribute_id, raw)))
            .collect()
    }

    pub fn insert(&mut self, attribute_id: u16, raw: i64) {
        self.values.insert(attribute_id, raw);
    }

    #[must_use]
    pub fn get(&self, attribute_id: u16) -> Option<i64> {
        self.values.get(&attribute_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, i64)> + '_ {
        self.values.iter().map(|(id, raw)| (*id, *raw))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(u16, i64)> for WireFrame {
    fn from_iter<I: IntoIterator<Item = (u16, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
