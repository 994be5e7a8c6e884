//! Attribute value encoding
//!
//! All multi-byte integers are little-endian. Strings carry a one byte
//! length prefix.

use crate::types::{DataType, WireError};
use bytes::BufMut;

/// A decoded attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Any integer, boolean, bitmap or enum type
    Integer(i64),
    /// Octet string
    Bytes(Vec<u8>),
    /// Character string
    Text(String),
    /// `NoData`
    Empty,
}

impl AttributeValue {
    /// Integer view of the value, if it has one
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

/// Append `raw` to `buf` encoded as `data_type`
#[allow(clippy::missing_errors_doc)]
pub fn encode_value(data_type: DataType, raw: i64, buf: &mut impl BufMut) -> Result<(), WireError> {
    let size = data_type
        .fixed_size()
        .filter(|&s| s > 0)
        .ok_or(WireError::UnsupportedDataType(data_type as u8))?;
    let (min, max) = data_type
        .range()
        .ok_or(WireError::UnsupportedDataType(data_type as u8))?;

    if raw < min || raw > max {
        return Err(WireError::ValueOverflow {
            data_type,
            value: raw,
        });
    }

    // Two's complement truncation handles signed types
    let bytes = raw.to_le_bytes();
    buf.put_slice(&bytes[..size]);
    Ok(())
}

/// Decode one value of `data_type` from the start of `data`
///
/// Returns the value and the number of bytes consumed.
#[allow(clippy::missing_errors_doc)]
pub fn decode_value(data_type: DataType, data: &[u8]) -> Result<(AttributeValue, usize), WireError> {
    match data_type.fixed_size() {
        Some(0) => Ok((AttributeValue::Empty, 0)),
        Some(size) => {
            if data.len() < size {
                return Err(WireError::FrameTooShort(data.len()));
            }
            let mut buf = [0u8; 8];
            buf[..size].copy_from_slice(&data[..size]);
            let unsigned = u64::from_le_bytes(buf);

            let value = if data_type.is_signed() {
                // Sign-extend from the type width
                let shift = 64 - (size as u32 * 8);
                ((unsigned << shift) as i64) >> shift
            } else {
                unsigned as i64
            };

            Ok((AttributeValue::Integer(value), size))
        }
        None => {
            let Some(&len) = data.first() else {
                return Err(WireError::FrameTooShort(0));
            };
            // 0xFF marks an invalid (unset) string
            let len = if len == 0xFF { 0 } else { len as usize };
            if data.len() < 1 + len {
                return Err(WireError::FrameTooShort(data.len()));
            }
            let content = &data[1..=len];
            let value = if data_type == DataType::CharString {
                AttributeValue::Text(String::from_utf8_lossy(content).into_owned())
            } else {
                AttributeValue::Bytes(content.to_vec())
            };
            Ok((value, 1 + len))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_int16_negative() {
        let mut buf = Vec::new();
        encode_value(DataType::Int16, -150, &mut buf).unwrap();
        assert_eq!(buf, vec![0x6A, 0xFF]);
    }

    #[test]
    fn test_encode_uint16() {
        let mut buf = Vec::new();
        encode_value(DataType::Uint16, 3600, &mut buf).unwrap();
        assert_eq!(buf, vec![0x10, 0x0E]);
    }

    #[test]
    fn test_encode_overflow() {
        let mut buf = Vec::new();
        let result = encode_value(DataType::Uint16, -1, &mut buf);
        assert!(matches!(result, Err(WireError::ValueOverflow { .. })));
        assert!(buf.is_empty());

        let result = encode_value(DataType::Boolean, 2, &mut buf);
        assert!(matches!(result, Err(WireError::ValueOverflow { .. })));
    }

    #[test]
    fn test_encode_string_unsupported() {
        let mut buf = Vec::new();
        let result = encode_value(DataType::CharString, 1, &mut buf);
        assert_eq!(result, Err(WireError::UnsupportedDataType(0x42)));
    }

    #[test]
    fn test_decode_signed() {
        let (value, used) = decode_value(DataType::Int16, &[0x6A, 0xFF, 0x00]).unwrap();
        assert_eq!(value, AttributeValue::Integer(-150));
        assert_eq!(used, 2);

        let (value, _) = decode_value(DataType::Int24, &[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(value, AttributeValue::Integer(-1));
    }

    #[test]
    fn test_decode_unsigned_high_bit() {
        let (value, _) = decode_value(DataType::Uint16, &[0xFF, 0xFF]).unwrap();
        assert_eq!(value, AttributeValue::Integer(0xFFFF));
    }

    #[test]
    fn test_decode_char_string() {
        let data = [0x03, b'a', b'b', b'c', 0x99];
        let (value, used) = decode_value(DataType::CharString, &data).unwrap();
        assert_eq!(value, AttributeValue::Text("abc".to_string()));
        assert_eq!(used, 4);
    }

    #[test]
    fn test_decode_truncated() {
        let result = decode_value(DataType::Uint32, &[0x01, 0x02]);
        assert_eq!(result, Err(WireError::FrameTooShort(2)));

        let result = decode_value(DataType::CharString, &[0x05, b'a']);
        assert_eq!(result, Err(WireError::FrameTooShort(2)));
    }
}
