//! Attribute record payloads for the ZCL global commands

use crate::frame::{GlobalCommand, ZclFrame};
use crate::types::{DataType, Status, WireError};
use crate::value::{decode_value, encode_value, AttributeValue};
use bytes::BufMut;

/// One attribute to write: ID, wire type and raw integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub attribute_id: u16,
    pub data_type: DataType,
    pub value: i64,
}

/// An attribute value received in a read response or report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedAttribute {
    pub attribute_id: u16,
    pub data_type: DataType,
    pub value: AttributeValue,
}

/// Per-attribute outcome of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteStatus {
    /// `None` when the device acknowledged every attribute at once
    pub attribute_id: Option<u16>,
    pub status: u8,
}

impl WriteStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.reason() == Some(Status::Success)
    }

    /// Decoded status, `None` for codes outside the known set
    #[must_use]
    pub fn reason(&self) -> Option<Status> {
        Status::try_from(self.status).ok()
    }
}

/// Build a Read Attributes payload: a list of attribute IDs
#[must_use]
pub fn read_attributes_payload(attribute_ids: &[u16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(attribute_ids.len() * 2);
    for id in attribute_ids {
        data.put_u16_le(*id);
    }
    data
}

/// Build a Write Attributes payload: `[id(2), type(1), value]*`
#[allow(clippy::missing_errors_doc)]
pub fn write_attributes_payload(records: &[WriteRecord]) -> Result<Vec<u8>, WireError> {
    let mut data = Vec::with_capacity(records.len() * 5);
    for record in records {
        data.put_u16_le(record.attribute_id);
        data.put_u8(record.data_type as u8);
        encode_value(record.data_type, record.value, &mut data)?;
    }
    Ok(data)
}

/// Create a complete Read Attributes frame
#[must_use]
pub fn read_attributes(
    transaction_seq: u8,
    manufacturer_code: Option<u16>,
    attribute_ids: &[u16],
) -> ZclFrame {
    ZclFrame::global(
        transaction_seq,
        GlobalCommand::ReadAttributes,
        manufacturer_code,
        read_attributes_payload(attribute_ids),
    )
}

/// Create a complete Write Attributes frame
#[allow(clippy::missing_errors_doc)]
pub fn write_attributes(
    transaction_seq: u8,
    manufacturer_code: Option<u16>,
    records: &[WriteRecord],
) -> Result<ZclFrame, WireError> {
    Ok(ZclFrame::global(
        transaction_seq,
        GlobalCommand::WriteAttributes,
        manufacturer_code,
        write_attributes_payload(records)?,
    ))
}

fn read_typed_value(
    payload: &[u8],
    idx: &mut usize,
    attribute_id: u16,
) -> Result<ReportedAttribute, WireError> {
    if payload.len() < *idx + 1 {
        return Err(WireError::FrameTooShort(payload.len()));
    }
    let type_id = payload[*idx];
    *idx += 1;
    let data_type = DataType::try_from(type_id)?;

    let (value, used) = decode_value(data_type, &payload[*idx..])
        .map_err(|_| WireError::FrameTooShort(payload.len()))?;
    *idx += used;

    Ok(ReportedAttribute {
        attribute_id,
        data_type,
        value,
    })
}

/// Parse a Read Attributes Response payload
///
/// Record format: `[id(2), status(1), type(1) + value if status == 0]`.
/// Records with a failure status carry no value and are skipped.
#[allow(clippy::missing_errors_doc)]
pub fn parse_read_response(payload: &[u8]) -> Result<Vec<ReportedAttribute>, WireError> {
    let mut attributes = Vec::new();
    let mut idx = 0;

    while idx < payload.len() {
        if payload.len() < idx + 3 {
            return Err(WireError::FrameTooShort(payload.len()));
        }
        let attribute_id = u16::from_le_bytes([payload[idx], payload[idx + 1]]);
        let status = payload[idx + 2];
        idx += 3;

        match Status::try_from(status) {
            Ok(Status::Success) => {}
            reason => {
                tracing::debug!(
                    "Read of attribute {:#06x} failed with status {:#04x} ({:?})",
                    attribute_id,
                    status,
                    reason.ok()
                );
                continue;
            }
        }

        attributes.push(read_typed_value(payload, &mut idx, attribute_id)?);
    }

    Ok(attributes)
}

/// Parse a Report Attributes payload
///
/// Record format: `[id(2), type(1), value]`.
#[allow(clippy::missing_errors_doc)]
pub fn parse_report(payload: &[u8]) -> Result<Vec<ReportedAttribute>, WireError> {
    let mut attributes = Vec::new();
    let mut idx = 0;

    while idx < payload.len() {
        if payload.len() < idx + 2 {
            return Err(WireError::FrameTooShort(payload.len()));
        }
        let attribute_id = u16::from_le_bytes([payload[idx], payload[idx + 1]]);
        idx += 2;

        attributes.push(read_typed_value(payload, &mut idx, attribute_id)?);
    }

    Ok(attributes)
}

/// Parse a Write Attributes Response payload
///
/// A lone success byte acknowledges every attribute; otherwise each failed
/// attribute gets a `[status(1), id(2)]` record.
#[allow(clippy::missing_errors_doc)]
pub fn parse_write_response(payload: &[u8]) -> Result<Vec<WriteStatus>, WireError> {
    if payload.len() == 1 {
        return Ok(vec![WriteStatus {
            attribute_id: None,
            status: payload[0],
        }]);
    }
    if payload.is_empty() || payload.len() % 3 != 0 {
        return Err(WireError::InvalidFrame(format!(
            "Write response length {} is not a multiple of 3",
            payload.len()
        )));
    }

    Ok(payload
        .chunks_exact(3)
        .map(|chunk| WriteStatus {
            attribute_id: Some(u16::from_le_bytes([chunk[1], chunk[2]])),
            status: chunk[0],
        })
        .collect())
}

/// Extract attribute values from a read response or report frame
#[allow(clippy::missing_errors_doc)]
pub fn attributes_from_frame(frame: &ZclFrame) -> Result<Vec<ReportedAttribute>, WireError> {
    match frame.global_command() {
        Some(GlobalCommand::ReadAttributesResponse) => parse_read_response(frame.payload()),
        Some(GlobalCommand::ReportAttributes) => parse_report(frame.payload()),
        _ => Err(WireError::UnexpectedCommand(frame.command_id())),
    }
}

/// Extract write statuses from a Write Attributes Response frame
#[allow(clippy::missing_errors_doc)]
pub fn write_statuses_from_frame(frame: &ZclFrame) -> Result<Vec<WriteStatus>, WireError> {
    match frame.global_command() {
        Some(GlobalCommand::WriteAttributesResponse) => parse_write_response(frame.payload()),
        _ => Err(WireError::UnexpectedCommand(frame.command_id())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_attributes_frame() {
        let frame = read_attributes(0x01, None, &[0xF000, 0xF001]);
        assert_eq!(frame.serialize(), vec![0x00, 0x01, 0x00, 0x00, 0xF0, 0x01, 0xF0]);
    }

    #[test]
    fn test_write_attributes_frame() {
        let records = [
            WriteRecord {
                attribute_id: 0xF001,
                data_type: DataType::Int16,
                value: -150,
            },
            WriteRecord {
                attribute_id: 0xF004,
                data_type: DataType::Boolean,
                value: 1,
            },
        ];
        let frame = write_attributes(0x05, Some(0x1002), &records).unwrap();
        assert_eq!(
            frame.serialize(),
            vec![
                0x04, 0x02, 0x10, 0x05, 0x02, // header
                0x01, 0xF0, 0x29, 0x6A, 0xFF, // temperature offset
                0x04, 0xF0, 0x10, 0x01, // led enable
            ]
        );
    }

    #[test]
    fn test_write_attributes_overflow() {
        let records = [WriteRecord {
            attribute_id: 0xF000,
            data_type: DataType::Uint16,
            value: 70_000,
        }];
        assert!(matches!(
            write_attributes(0, None, &records),
            Err(WireError::ValueOverflow { .. })
        ));
    }

    #[test]
    fn test_parse_read_response_skips_failures() {
        let payload = [
            0x00, 0xF0, 0x00, 0x21, 0x3C, 0x00, // 0xF000 = 60
            0x05, 0xF0, 0x86, // 0xF005 unsupported
            0x01, 0xF0, 0x00, 0x29, 0x9C, 0xFF, // 0xF001 = -100
        ];
        let attributes = parse_read_response(&payload).unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].attribute_id, 0xF000);
        assert_eq!(attributes[0].value, AttributeValue::Integer(60));
        assert_eq!(attributes[1].attribute_id, 0xF001);
        assert_eq!(attributes[1].value, AttributeValue::Integer(-100));
    }

    #[test]
    fn test_parse_read_response_truncated() {
        let payload = [0x00, 0xF0, 0x00, 0x21, 0x3C];
        assert!(matches!(
            parse_read_response(&payload),
            Err(WireError::FrameTooShort(_))
        ));
    }

    #[test]
    fn test_parse_report_with_string() {
        let payload = [
            0x05, 0x00, 0x42, 0x02, b'O', b'K', // model identifier
            0x04, 0xF0, 0x10, 0x00, // led off
        ];
        let attributes = parse_report(&payload).unwrap();
        assert_eq!(attributes[0].value, AttributeValue::Text("OK".to_string()));
        assert_eq!(attributes[1].value.as_integer(), Some(0));
    }

    #[test]
    fn test_parse_report_unknown_type() {
        let payload = [0x00, 0xF0, 0x39, 0x00, 0x00, 0x80, 0x3F];
        assert_eq!(
            parse_report(&payload),
            Err(WireError::UnsupportedDataType(0x39))
        );
    }

    #[test]
    fn test_parse_write_response() {
        let all_ok = parse_write_response(&[0x00]).unwrap();
        assert!(all_ok[0].is_success());
        assert_eq!(all_ok[0].attribute_id, None);

        let failures = parse_write_response(&[0x87, 0x00, 0xF0, 0x42, 0x01, 0xF0]).unwrap();
        assert_eq!(failures[0].attribute_id, Some(0xF000));
        assert!(!failures[0].is_success());
        assert_eq!(failures[0].reason(), Some(Status::InvalidValue));
        assert_eq!(failures[1].reason(), None);

        assert!(parse_write_response(&[0x87, 0x00]).is_err());
    }

    #[test]
    fn test_attributes_from_frame_rejects_other_commands() {
        let frame = read_attributes(0x01, None, &[0xF000]);
        assert_eq!(
            attributes_from_frame(&frame),
            Err(WireError::UnexpectedCommand(0x00))
        );
    }
}
