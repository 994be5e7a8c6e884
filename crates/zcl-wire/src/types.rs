//! Common types used throughout the wire layer

use thiserror::Error;

/// Wire errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Frame too short: {0} bytes")]
    FrameTooShort(usize),

    #[error("Unsupported data type: {0:#04X}")]
    UnsupportedDataType(u8),

    #[error("Value {value} does not fit data type {data_type:?}")]
    ValueOverflow { data_type: DataType, value: i64 },

    #[error("Unexpected command ID: {0:#04X}")]
    UnexpectedCommand(u8),
}

/// ZCL status codes carried in read and write responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Success = 0x00,
    Failure = 0x01,
    UnsupportedAttribute = 0x86,
    InvalidValue = 0x87,
    ReadOnly = 0x88,
    InsufficientSpace = 0x89,
    InvalidDataType = 0x8D,
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x00 => Ok(Status::Success),
            0x01 => Ok(Status::Failure),
            0x86 => Ok(Status::UnsupportedAttribute),
            0x87 => Ok(Status::InvalidValue),
            0x88 => Ok(Status::ReadOnly),
            0x89 => Ok(Status::InsufficientSpace),
            0x8D => Ok(Status::InvalidDataType),
            _ => Err(value),
        }
    }
}

impl Status {
    /// Snake-case name for logs and host messages
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failure => "failure",
            Status::UnsupportedAttribute => "unsupported_attribute",
            Status::InvalidValue => "invalid_value",
            Status::ReadOnly => "read_only",
            Status::InsufficientSpace => "insufficient_space",
            Status::InvalidDataType => "invalid_data_type",
        }
    }
}

/// ZCL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    NoData = 0x00,
    Data8 = 0x08,
    Data16 = 0x09,
    Boolean = 0x10,
    Bitmap8 = 0x18,
    Bitmap16 = 0x19,
    Uint8 = 0x20,
    Uint16 = 0x21,
    Uint24 = 0x22,
    Uint32 = 0x23,
    Int8 = 0x28,
    Int16 = 0x29,
    Int24 = 0x2A,
    Int32 = 0x2B,
    Enum8 = 0x30,
    Enum16 = 0x31,
    OctetString = 0x41,
    CharString = 0x42,
}

impl TryFrom<u8> for DataType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, WireError> {
        Ok(match value {
            0x00 => DataType::NoData,
            0x08 => DataType::Data8,
            0x09 => DataType::Data16,
            0x10 => DataType::Boolean,
            0x18 => DataType::Bitmap8,
            0x19 => DataType::Bitmap16,
            0x20 => DataType::Uint8,
            0x21 => DataType::Uint16,
            0x22 => DataType::Uint24,
            0x23 => DataType::Uint32,
            0x28 => DataType::Int8,
            0x29 => DataType::Int16,
            0x2A => DataType::Int24,
            0x2B => DataType::Int32,
            0x30 => DataType::Enum8,
            0x31 => DataType::Enum16,
            0x41 => DataType::OctetString,
            0x42 => DataType::CharString,
            other => return Err(WireError::UnsupportedDataType(other)),
        })
    }
}

impl DataType {
    /// Fixed encoded size in bytes, `None` for length-prefixed strings
    #[must_use]
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            DataType::NoData => Some(0),
            DataType::Data8
            | DataType::Boolean
            | DataType::Bitmap8
            | DataType::Uint8
            | DataType::Int8
            | DataType::Enum8 => Some(1),
            DataType::Data16
            | DataType::Bitmap16
            | DataType::Uint16
            | DataType::Int16
            | DataType::Enum16 => Some(2),
            DataType::Uint24 | DataType::Int24 => Some(3),
            DataType::Uint32 | DataType::Int32 => Some(4),
            DataType::OctetString | DataType::CharString => None,
        }
    }

    /// Whether the type carries a two's complement signed integer
    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int24 | DataType::Int32
        )
    }

    /// Inclusive integer range representable by this type
    #[must_use]
    pub fn range(self) -> Option<(i64, i64)> {
        let size = self.fixed_size()?;
        if size == 0 {
            return None;
        }
        if self == DataType::Boolean {
            return Some((0, 1));
        }
        let bits = (size * 8) as u32;
        if self.is_signed() {
            Some((-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1))
        } else {
            Some((0, (1i64 << bits) - 1))
        }
    }
}
