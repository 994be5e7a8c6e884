//! ZCL wire encoding for attribute transactions
//!
//! This crate implements the Zigbee Cluster Library frame header, the
//! little-endian attribute value encoding, and the record layouts of the
//! read/write/report global commands.

pub mod frame;
pub mod records;
pub mod types;
pub mod value;

pub use frame::{GlobalCommand, ZclFrame};
pub use records::{ReportedAttribute, WriteRecord, WriteStatus};
pub use types::*;
pub use value::AttributeValue;
