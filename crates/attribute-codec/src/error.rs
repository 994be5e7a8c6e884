//! Error types for the attribute codec

use thiserror::Error;

/// Errors that can occur while encoding attributes or building tables
#[derive(Error, Debug)]
pub enum CodecError {
    /// Field name not present in the table
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Value outside the field's declared domain
    #[error("Value {value} for {name} is out of range [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value cannot be interpreted for the field
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    /// Field descriptor is inconsistent
    #[error("Invalid field {name}: {reason}")]
    InvalidField { name: String, reason: String },

    /// Two fields share a name
    #[error("Duplicate field name: {0}")]
    DuplicateName(String),

    /// Two fields share an attribute ID
    #[error("Duplicate attribute ID: {0:#06X}")]
    DuplicateAttribute(u16),

    /// No profile matches the device model
    #[error("Unknown device model: {0}")]
    UnknownModel(String),

    /// ZCL encoding failure
    #[error("Wire error: {0}")]
    Wire(#[from] zcl_wire::WireError),

    /// IO error (profile files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
