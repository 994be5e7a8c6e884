//! Bidirectional attribute codec
//!
//! Translates between a [`WireFrame`] (attribute ID to raw integer) and a
//! [`ConfigRecord`] (field name to domain value) under a [`FieldTable`].
//! Every function here is pure; tables are shared read-only.

use crate::error::CodecError;
use crate::field::FieldTable;
use crate::value::{ConfigRecord, FieldValue};
use crate::wire_frame::WireFrame;

/// Decode a frame into the fields it carries
///
/// Fields absent from the frame are omitted. Attributes the table does not
/// model are ignored. Never fails.
#[must_use]
pub fn decode(frame: &WireFrame, table: &FieldTable) -> ConfigRecord {
    let mut record = ConfigRecord::new();

    for field in table.iter() {
        if let Some(raw) = frame.get(field.attribute_id) {
            record.insert(field.name.as_str(), field.decode_raw(raw));
        }
    }

    for (attribute_id, raw) in frame.iter() {
        if table.by_id(attribute_id).is_none() {
            tracing::trace!(
                "Ignoring unmodelled attribute {:#06x} = {}",
                attribute_id,
                raw
            );
        }
    }

    record
}

/// Encode one field value into the `(attribute_id, raw)` pair to write
#[allow(clippy::missing_errors_doc)]
pub fn encode(name: &str, value: &FieldValue, table: &FieldTable) -> Result<(u16, i64), CodecError> {
    let field = table
        .get(name)
        .ok_or_else(|| CodecError::UnknownField(name.to_string()))?;
    let raw = field.encode_value(value)?;

    tracing::debug!(
        "Encoded {}={:?} as {:#06x}={}",
        name,
        value,
        field.attribute_id,
        raw
    );

    Ok((field.attribute_id, raw))
}

/// Encode every field in `record`, in table order
///
/// Fails on the first invalid field without returning a partial result.
#[allow(clippy::missing_errors_doc)]
pub fn encode_batch(record: &ConfigRecord, table: &FieldTable) -> Result<Vec<(u16, i64)>, CodecError> {
    if let Some((name, _)) = record.iter().find(|(name, _)| table.get(name).is_none()) {
        return Err(CodecError::UnknownField(name.to_string()));
    }

    table
        .iter()
        .filter_map(|field| {
            record
                .get(&field.name)
                .map(|value| encode(&field.name, value, table))
        })
        .collect()
}

/// Resolve a field name to its attribute ID
#[allow(clippy::missing_errors_doc)]
pub fn lookup(name: &str, table: &FieldTable) -> Result<u16, CodecError> {
    table
        .get(name)
        .map(|f| f.attribute_id)
        .ok_or_else(|| CodecError::UnknownField(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{AttributeField, Domain, Encoding, WireType};

    fn table() -> FieldTable {
        FieldTable::new(vec![
            AttributeField::numeric(
                "sensor_read_interval",
                0xF000,
                Encoding::Raw,
                WireType::Uint16,
                Domain::new(10.0, 3600.0, 1.0),
            ),
            AttributeField::numeric(
                "temperature_offset",
                0xF001,
                Encoding::FixedPoint { scale: 100 },
                WireType::Int16,
                Domain::new(-5.0, 5.0, 0.01),
            ),
            AttributeField::boolean("led_enable", 0xF004),
        ])
        .unwrap()
    }

    #[test]
    fn test_decode_empty_frame() {
        assert!(decode(&WireFrame::new(), &table()).is_empty());
    }

    #[test]
    fn test_decode_raw_numeric() {
        let frame: WireFrame = [(0xF000, 30)].into_iter().collect();
        let record = decode(&frame, &table());
        assert_eq!(record.len(), 1);
        assert_eq!(
            record.get("sensor_read_interval"),
            Some(&FieldValue::Integer(30))
        );
    }

    #[test]
    fn test_decode_fixed_point_and_boolean() {
        let frame: WireFrame = [(0xF001, -123), (0xF004, 0)].into_iter().collect();
        let record = decode(&frame, &table());
        assert_eq!(record.get("temperature_offset"), Some(&FieldValue::Number(-1.23)));
        assert_eq!(record.get("led_enable"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_decode_ignores_unknown_attribute() {
        let frame: WireFrame = [(0xFFFF, 7)].into_iter().collect();
        assert!(decode(&frame, &table()).is_empty());
    }

    #[test]
    fn test_decode_is_table_ordered() {
        let frame: WireFrame = [(0xF004, 1), (0xF000, 60)].into_iter().collect();
        let record = decode(&frame, &table());
        let names: Vec<_> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["sensor_read_interval", "led_enable"]);
    }

    #[test]
    fn test_encode_fixed_point() {
        let result = encode("temperature_offset", &FieldValue::Number(1.23), &table()).unwrap();
        assert_eq!(result, (0xF001, 123));
    }

    #[test]
    fn test_encode_negative_half_rounds_up() {
        let result = encode("temperature_offset", &FieldValue::Number(-0.005), &table()).unwrap();
        assert_eq!(result, (0xF001, 0));

        let result = encode("temperature_offset", &FieldValue::Number(0.005), &table()).unwrap();
        assert_eq!(result, (0xF001, 1));
    }

    #[test]
    fn test_encode_out_of_range() {
        let result = encode("temperature_offset", &FieldValue::Number(10.0), &table());
        assert!(matches!(
            result,
            Err(CodecError::OutOfRange { max, .. }) if max == 5.0
        ));

        let result = encode("sensor_read_interval", &FieldValue::Integer(5), &table());
        assert!(matches!(result, Err(CodecError::OutOfRange { .. })));
    }

    #[test]
    fn test_encode_unknown_field() {
        let result = encode("nonexistent_field", &FieldValue::Integer(1), &table());
        assert!(matches!(result, Err(CodecError::UnknownField(n)) if n == "nonexistent_field"));
    }

    #[test]
    fn test_encode_raw_rounds() {
        let result = encode("sensor_read_interval", &FieldValue::Number(30.5), &table()).unwrap();
        assert_eq!(result, (0xF000, 31));
    }

    #[test]
    fn test_encode_boolean_truthiness() {
        let t = table();
        assert_eq!(encode("led_enable", &FieldValue::Bool(true), &t).unwrap(), (0xF004, 1));
        assert_eq!(encode("led_enable", &FieldValue::Integer(0), &t).unwrap(), (0xF004, 0));
        assert_eq!(encode("led_enable", &FieldValue::Integer(7), &t).unwrap(), (0xF004, 1));
    }

    #[test]
    fn test_encode_rejects_non_numeric() {
        let result = encode("temperature_offset", &FieldValue::Bool(true), &table());
        assert!(matches!(result, Err(CodecError::InvalidValue { .. })));

        let result = encode("temperature_offset", &FieldValue::Number(f64::NAN), &table());
        assert!(matches!(result, Err(CodecError::InvalidValue { .. })));
    }

    #[test]
    fn test_encode_batch_table_order() {
        let record: ConfigRecord = [
            ("led_enable", FieldValue::Bool(false)),
            ("temperature_offset", FieldValue::Number(-2.5)),
            ("sensor_read_interval", FieldValue::Integer(120)),
        ]
        .into_iter()
        .collect();

        let pairs = encode_batch(&record, &table()).unwrap();
        assert_eq!(pairs, vec![(0xF000, 120), (0xF001, -250), (0xF004, 0)]);
    }

    #[test]
    fn test_encode_batch_is_atomic() {
        let record: ConfigRecord = [
            ("sensor_read_interval", FieldValue::Integer(120)),
            ("temperature_offset", FieldValue::Number(9.0)),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            encode_batch(&record, &table()),
            Err(CodecError::OutOfRange { .. })
        ));

        let record: ConfigRecord = [
            ("sensor_read_interval", FieldValue::Integer(120)),
            ("bogus", FieldValue::Integer(1)),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            encode_batch(&record, &table()),
            Err(CodecError::UnknownField(n)) if n == "bogus"
        ));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("led_enable", &table()).unwrap(), 0xF004);
        assert!(matches!(lookup("nope", &table()), Err(CodecError::UnknownField(_))));
    }

    #[test]
    fn test_fixed_point_round_trip_precision() {
        let t = table();
        let mut v = -5.0;
        while v <= 5.0 {
            let (id, raw) = encode("temperature_offset", &FieldValue::Number(v), &t).unwrap();
            let frame: WireFrame = [(id, raw)].into_iter().collect();
            let decoded = decode(&frame, &t);
            let back = decoded.get("temperature_offset").and_then(FieldValue::as_f64).unwrap();
            assert!((back - v).abs() <= 0.5 / 100.0 + 1e-9, "{v} -> {back}");
            v += 0.0037;
        }
    }
}
