//! ZCL frame structure

use crate::types::WireError;
use bytes::{Buf, BufMut};

/// Minimum frame size: `frame_control(1)` + tsn(1) + command(1) = 3
pub const MIN_FRAME_SIZE: usize = 3;

/// Frame control bits
pub mod frame_control {
    /// Frame type mask (bits 0-1)
    pub const TYPE_MASK: u8 = 0x03;
    /// Cluster-specific command frame type
    pub const CLUSTER_SPECIFIC: u8 = 0x01;
    /// Manufacturer code present
    pub const MANUFACTURER_SPECIFIC: u8 = 0x04;
    /// Server to client direction
    pub const SERVER_TO_CLIENT: u8 = 0x08;
    /// Disable default response
    pub const DISABLE_DEFAULT_RESPONSE: u8 = 0x10;
}

/// ZCL global commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GlobalCommand {
    ReadAttributes = 0x00,
    ReadAttributesResponse = 0x01,
    WriteAttributes = 0x02,
    WriteAttributesUndivided = 0x03,
    WriteAttributesResponse = 0x04,
    WriteAttributesNoResponse = 0x05,
    ConfigureReporting = 0x06,
    ConfigureReportingResponse = 0x07,
    ReportAttributes = 0x0A,
    DefaultResponse = 0x0B,
}

impl GlobalCommand {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(GlobalCommand::ReadAttributes),
            0x01 => Some(GlobalCommand::ReadAttributesResponse),
            0x02 => Some(GlobalCommand::WriteAttributes),
            0x03 => Some(GlobalCommand::WriteAttributesUndivided),
            0x04 => Some(GlobalCommand::WriteAttributesResponse),
            0x05 => Some(GlobalCommand::WriteAttributesNoResponse),
            0x06 => Some(GlobalCommand::ConfigureReporting),
            0x07 => Some(GlobalCommand::ConfigureReportingResponse),
            0x0A => Some(GlobalCommand::ReportAttributes),
            0x0B => Some(GlobalCommand::DefaultResponse),
            _ => None,
        }
    }
}

/// A ZCL frame as carried in an APS data ASDU
///
/// ```text
/// frame_control(1) [manufacturer_code(2, LE) if bit 2] tsn(1) command(1) payload(..)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZclFrame {
    frame_control: u8,
    manufacturer_code: Option<u16>,
    transaction_seq: u8,
    command_id: u8,
    payload: Vec<u8>,
}

impl ZclFrame {
    /// Create a global (profile-wide) command frame, client to server
    ///
    /// The manufacturer-specific bit is set when `manufacturer_code` is given.
    #[must_use]
    pub fn global(
        transaction_seq: u8,
        command: GlobalCommand,
        manufacturer_code: Option<u16>,
        payload: Vec<u8>,
    ) -> Self {
        let mut frame_control = 0x00;
        if manufacturer_code.is_some() {
            frame_control |= frame_control::MANUFACTURER_SPECIFIC;
        }

        Self {
            frame_control,
            manufacturer_code,
            transaction_seq,
            command_id: command as u8,
            payload,
        }
    }

    /// Parse an ASDU into header fields and payload
    ///
    /// The payload is kept as-is; see [`crate::records`] for its layouts.
    #[allow(clippy::missing_errors_doc)]
    pub fn parse(data: &[u8]) -> Result<Self, WireError> {
        let too_short = || WireError::FrameTooShort(data.len());
        let mut buf = data;
        if buf.remaining() < MIN_FRAME_SIZE {
            return Err(too_short());
        }

        let frame_control = buf.get_u8();
        let manufacturer_code = match frame_control & frame_control::MANUFACTURER_SPECIFIC {
            0 => None,
            _ => {
                // code, then tsn and command id
                if buf.remaining() < 4 {
                    return Err(too_short());
                }
                Some(buf.get_u16_le())
            }
        };
        let transaction_seq = buf.get_u8();
        let command_id = buf.get_u8();

        Ok(Self {
            frame_control,
            manufacturer_code,
            transaction_seq,
            command_id,
            payload: buf.to_vec(),
        })
    }

    #[must_use]
    pub fn frame_control(&self) -> u8 {
        self.frame_control
    }

    /// Manufacturer code, present on manufacturer-specific frames
    #[must_use]
    pub fn manufacturer_code(&self) -> Option<u16> {
        self.manufacturer_code
    }

    #[must_use]
    pub fn transaction_seq(&self) -> u8 {
        self.transaction_seq
    }

    /// Frame type bits say cluster-specific rather than global
    #[must_use]
    pub fn is_cluster_specific(&self) -> bool {
        (self.frame_control & frame_control::TYPE_MASK) == frame_control::CLUSTER_SPECIFIC
    }

    /// Direction bit: sent by the cluster server
    #[must_use]
    pub fn is_from_server(&self) -> bool {
        (self.frame_control & frame_control::SERVER_TO_CLIENT) != 0
    }

    #[must_use]
    pub fn command_id(&self) -> u8 {
        self.command_id
    }

    /// Global command, if this is a global frame with a known command
    #[must_use]
    pub fn global_command(&self) -> Option<GlobalCommand> {
        if self.is_cluster_specific() {
            return None;
        }
        GlobalCommand::from_u8(self.command_id)
    }

    /// Command payload following the header
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Header and payload as transmitted
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(5 + self.payload.len());
        data.put_u8(self.frame_control);
        if let Some(mfr) = self.manufacturer_code {
            data.put_u16_le(mfr);
        }
        data.put_u8(self.transaction_seq);
        data.put_u8(self.command_id);
        data.put_slice(&self.payload);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_too_short() {
        let result = ZclFrame::parse(&[0x00, 0x01]);
        assert!(matches!(result, Err(WireError::FrameTooShort(2))));
    }

    #[test]
    fn test_manufacturer_specific_header() {
        let frame = ZclFrame::global(0x2A, GlobalCommand::ReadAttributes, Some(0x1002), vec![]);
        assert_eq!(frame.serialize(), vec![0x04, 0x02, 0x10, 0x2A, 0x00]);
    }

    #[test]
    fn test_manufacturer_code_truncated() {
        // Manufacturer bit set but only one code byte follows
        let result = ZclFrame::parse(&[0x04, 0x02]);
        assert!(matches!(result, Err(WireError::FrameTooShort(2))));
    }

    #[test]
    fn test_parse_server_report() {
        let data = [0x1C, 0x02, 0x10, 0x07, 0x0A, 0x00, 0xF0, 0x21, 0x3C, 0x00];
        let frame = ZclFrame::parse(&data).unwrap();
        assert!(frame.is_from_server());
        assert!(!frame.is_cluster_specific());
        assert_eq!(frame.manufacturer_code(), Some(0x1002));
        assert_eq!(frame.transaction_seq(), 0x07);
        assert_eq!(frame.global_command(), Some(GlobalCommand::ReportAttributes));
        assert_eq!(frame.payload(), &[0x00, 0xF0, 0x21, 0x3C, 0x00]);
    }

    #[test]
    fn test_cluster_specific_has_no_global_command() {
        let frame = ZclFrame::parse(&[0x01, 0x05, 0x00]).unwrap();
        assert!(frame.is_cluster_specific());
        assert_eq!(frame.global_command(), None);
    }
}
