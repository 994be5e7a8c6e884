//! Attribute field descriptors and field tables

use crate::error::CodecError;
use crate::value::{round_half_up, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use zcl_wire::DataType;

/// How a domain value maps onto the wire integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Encoding {
    /// Transmitted as-is
    Raw,
    /// Wire value is the domain value times `scale`
    FixedPoint { scale: u32 },
}

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Boolean,
}

/// ZCL wire type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Boolean,
    Uint8,
    Uint16,
    Uint32,
    Int8,
    Int16,
    Int32,
    Enum8,
}

impl WireType {
    #[must_use]
    pub fn data_type(self) -> DataType {
        match self {
            WireType::Boolean => DataType::Boolean,
            WireType::Uint8 => DataType::Uint8,
            WireType::Uint16 => DataType::Uint16,
            WireType::Uint32 => DataType::Uint32,
            WireType::Int8 => DataType::Int8,
            WireType::Int16 => DataType::Int16,
            WireType::Int32 => DataType::Int32,
            WireType::Enum8 => DataType::Enum8,
        }
    }
}

/// Allowed range in domain units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
    /// Advisory only, not enforced at encode time
    pub step: f64,
}

impl Domain {
    #[must_use]
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Static descriptor of one configuration attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeField {
    /// Domain-level field name (state key)
    pub name: String,
    /// Wire attribute ID
    pub attribute_id: u16,
    pub encoding: Encoding,
    pub domain: Domain,
    pub kind: FieldKind,
    pub wire_type: WireType,
    /// Display unit
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Firmware default value
    #[serde(default)]
    pub default: Option<FieldValue>,
}

impl AttributeField {
    /// Create a numeric field
    #[must_use]
    pub fn numeric(
        name: &str,
        attribute_id: u16,
        encoding: Encoding,
        wire_type: WireType,
        domain: Domain,
    ) -> Self {
        Self {
            name: name.to_string(),
            attribute_id,
            encoding,
            domain,
            kind: FieldKind::Numeric,
            wire_type,
            unit: None,
            description: None,
            default: None,
        }
    }

    /// Create a boolean flag field
    #[must_use]
    pub fn boolean(name: &str, attribute_id: u16) -> Self {
        Self {
            name: name.to_string(),
            attribute_id,
            encoding: Encoding::Raw,
            domain: Domain::new(0.0, 1.0, 1.0),
            kind: FieldKind::Boolean,
            wire_type: WireType::Boolean,
            unit: None,
            description: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Convert a raw wire integer to the domain value
    #[must_use]
    pub fn decode_raw(&self, raw: i64) -> FieldValue {
        match (self.encoding, self.kind) {
            (Encoding::FixedPoint { scale }, _) => FieldValue::Number(raw as f64 / f64::from(scale)),
            (Encoding::Raw, FieldKind::Boolean) => FieldValue::Bool(raw != 0),
            (Encoding::Raw, FieldKind::Numeric) => FieldValue::Integer(raw),
        }
    }

    /// Validate a domain value and convert it to the raw wire integer
    #[allow(clippy::missing_errors_doc)]
    pub fn encode_value(&self, value: &FieldValue) -> Result<i64, CodecError> {
        if self.kind == FieldKind::Boolean {
            return Ok(i64::from(value.is_truthy()));
        }

        let v = value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CodecError::InvalidValue {
                name: self.name.clone(),
                reason: format!("expected a finite number, got {value:?}"),
            })?;

        if !self.domain.contains(v) {
            return Err(CodecError::OutOfRange {
                name: self.name.clone(),
                value: v,
                min: self.domain.min,
                max: self.domain.max,
            });
        }

        let scaled = match self.encoding {
            Encoding::Raw => v,
            Encoding::FixedPoint { scale } => v * f64::from(scale),
        };

        Ok(round_half_up(scaled) as i64)
    }

    fn validate(&self) -> Result<(), CodecError> {
        let invalid = |reason: &str| CodecError::InvalidField {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.domain.min > self.domain.max || self.domain.min.is_nan() || self.domain.max.is_nan()
        {
            return Err(invalid("domain min exceeds max"));
        }
        match (self.encoding, self.kind) {
            (Encoding::FixedPoint { scale: 0 }, _) => Err(invalid("scale must be nonzero")),
            (Encoding::FixedPoint { .. }, FieldKind::Boolean) => {
                Err(invalid("boolean fields cannot be fixed point"))
            }
            _ => Ok(()),
        }
    }
}

/// Ordered set of fields, unique by name and by attribute ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AttributeField>", into = "Vec<AttributeField>")]
pub struct FieldTable {
    fields: Vec<AttributeField>,
}

impl FieldTable {
    /// Build a table, rejecting duplicate names or attribute IDs
    #[allow(clippy::missing_errors_doc)]
    pub fn new(fields: Vec<AttributeField>) -> Result<Self, CodecError> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();

        for field in &fields {
            field.validate()?;
            if !names.insert(field.name.as_str()) {
                return Err(CodecError::DuplicateName(field.name.clone()));
            }
            if !ids.insert(field.attribute_id) {
                return Err(CodecError::DuplicateAttribute(field.attribute_id));
            }
        }

        Ok(Self { fields })
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by attribute ID
    #[must_use]
    pub fn by_id(&self, attribute_id: u16) -> Option<&AttributeField> {
        self.fields.iter().find(|f| f.attribute_id == attribute_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeField> {
        self.fields.iter()
    }

    /// Attribute IDs in table order
    #[must_use]
    pub fn attribute_ids(&self) -> Vec<u16> {
        self.fields.iter().map(|f| f.attribute_id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<AttributeField>> for FieldTable {
    type Error = CodecError;

    fn try_from(fields: Vec<AttributeField>) -> Result<Self, CodecError> {
        Self::new(fields)
    }
}

impl From<FieldTable> for Vec<AttributeField> {
    fn from(table: FieldTable) -> Self {
        table.fields
    }
}
