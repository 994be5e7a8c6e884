//! Attribute codec for manufacturer-specific Zigbee configuration
//!
//! This crate maps raw ZCL attribute values to named, unit-carrying
//! configuration fields and back, and wraps that mapping in the converter
//! call shapes a Zigbee-to-MQTT host expects.

pub mod cluster;
pub mod codec;
pub mod converter;
pub mod error;
pub mod field;
pub mod persistence;
pub mod profile;
pub mod value;
pub mod wire_frame;

pub use codec::{decode, encode, encode_batch, lookup};
pub use converter::{
    ConfigurePlan, DeviceConverter, Expose, ReadRequest, RejectedWrite, WriteRequest,
};
pub use error::CodecError;
pub use field::{AttributeField, Domain, Encoding, FieldKind, FieldTable, WireType};
pub use profile::{BuiltinProfile, DeviceProfile, ProfileRegistry};
pub use value::{ConfigRecord, FieldValue};
pub use wire_frame::{FrameKey, WireFrame};
