//! Host-facing converter: the convert / set / get / configure call shapes

use crate::cluster::access;
use crate::codec;
use crate::error::CodecError;
use crate::field::{FieldKind, WireType};
use crate::profile::DeviceProfile;
use crate::value::{ConfigRecord, FieldValue};
use crate::wire_frame::WireFrame;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use zcl_wire::{records, Status, WriteRecord, WriteStatus, ZclFrame};

/// One attribute of a write transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireAttribute {
    pub attribute_id: u16,
    pub wire_type: WireType,
    pub value: i64,
}

/// A write transaction for the host to issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteRequest {
    pub cluster: u16,
    pub endpoint: u8,
    pub manufacturer_code: Option<u16>,
    pub attributes: Vec<WireAttribute>,
    /// State to publish once the device acknowledges the write
    pub state: ConfigRecord,
}

impl WriteRequest {
    /// Host-style payload: attribute ID to raw value
    #[must_use]
    pub fn payload(&self) -> Value {
        Value::Object(
            self.attributes
                .iter()
                .map(|a| (a.attribute_id.to_string(), Value::from(a.value)))
                .collect(),
        )
    }

    /// Serialize as a ZCL Write Attributes frame
    #[allow(clippy::missing_errors_doc)]
    pub fn to_zcl(&self, transaction_seq: u8) -> Result<Vec<u8>, CodecError> {
        let records: Vec<WriteRecord> = self
            .attributes
            .iter()
            .map(|a| WriteRecord {
                attribute_id: a.attribute_id,
                data_type: a.wire_type.data_type(),
                value: a.value,
            })
            .collect();
        let frame = records::write_attributes(transaction_seq, self.manufacturer_code, &records)?;
        Ok(frame.serialize())
    }
}

/// A read transaction for the host to issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadRequest {
    pub cluster: u16,
    pub endpoint: u8,
    pub manufacturer_code: Option<u16>,
    pub attributes: Vec<u16>,
}

impl ReadRequest {
    /// Serialize as a ZCL Read Attributes frame
    #[must_use]
    pub fn to_zcl(&self, transaction_seq: u8) -> Vec<u8> {
        records::read_attributes(transaction_seq, self.manufacturer_code, &self.attributes)
            .serialize()
    }
}

/// One attribute the device refused to write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedWrite {
    /// Field name, if the attribute is modelled
    pub field: Option<String>,
    /// `None` when the device sent a single status for the whole write
    pub attribute_id: Option<u16>,
    /// ZCL status code
    pub status: u8,
    /// Status name, `None` for codes outside the known set
    pub reason: Option<&'static str>,
}

/// Steps for the host to run after a device joins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurePlan {
    pub endpoint: u8,
    /// Clusters to bind to the coordinator
    pub bind_clusters: Vec<u16>,
    /// Initial read of every configuration attribute
    pub read: ReadRequest,
}

/// UI descriptor of one configuration field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expose {
    Numeric {
        name: String,
        access: u8,
        value_min: f64,
        value_max: f64,
        value_step: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Binary {
        name: String,
        access: u8,
        value_on: bool,
        value_off: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Converter bound to one device profile
#[derive(Debug, Clone)]
pub struct DeviceConverter {
    profile: Arc<DeviceProfile>,
}

impl DeviceConverter {
    #[must_use]
    pub fn new(profile: Arc<DeviceProfile>) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Decode an inbound attribute report or read response
    #[must_use]
    pub fn convert(&self, frame: &WireFrame) -> ConfigRecord {
        let record = codec::decode(frame, &self.profile.fields);
        tracing::debug!(
            "Decoded {} of {} attributes into state",
            record.len(),
            frame.len()
        );
        record
    }

    /// Decode a host `data` object with string or integer keys
    #[must_use]
    pub fn convert_json(&self, data: &Value) -> ConfigRecord {
        self.convert(&WireFrame::from_json(data))
    }

    /// Decode a raw ZCL read-response or report frame
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_zcl(&self, asdu: &[u8]) -> Result<ConfigRecord, CodecError> {
        let frame = ZclFrame::parse(asdu)?;
        if frame.manufacturer_code() != self.profile.manufacturer_code {
            tracing::debug!(
                "Manufacturer code {:?} differs from profile {:?}",
                frame.manufacturer_code(),
                self.profile.manufacturer_code
            );
        }
        let attributes = records::attributes_from_frame(&frame)?;
        Ok(self.convert(&WireFrame::from_reported(&attributes)))
    }

    /// Check a Write Attributes Response against the profile
    ///
    /// Returns the rejected writes; an empty list means the device accepted
    /// the whole transaction and its `state` can be published.
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_write_response(&self, asdu: &[u8]) -> Result<Vec<RejectedWrite>, CodecError> {
        let frame = ZclFrame::parse(asdu)?;
        let rejected: Vec<RejectedWrite> = records::write_statuses_from_frame(&frame)?
            .into_iter()
            .filter(|s| !s.is_success())
            .map(|s| self.rejected_write(s))
            .collect();

        for r in &rejected {
            tracing::warn!(
                "Device rejected write of {} with status {:#04x} ({})",
                r.field.as_deref().unwrap_or("<unknown>"),
                r.status,
                r.reason.unwrap_or("unknown")
            );
        }
        Ok(rejected)
    }

    /// Build the write for a single field
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_set(&self, name: &str, value: FieldValue) -> Result<WriteRequest, CodecError> {
        let (attribute_id, raw) = codec::encode(name, &value, &self.profile.fields)?;
        let mut state = ConfigRecord::new();
        state.insert(name, value);
        Ok(self.write_request(vec![(attribute_id, raw)], state))
    }

    /// Interpret a host JSON value for one field
    ///
    /// Boolean fields take any value by host truthiness, as `value ? 1 : 0`
    /// does. Numeric fields need a number or a numeric string.
    #[allow(clippy::missing_errors_doc)]
    pub fn field_value(&self, name: &str, value: &Value) -> Result<FieldValue, CodecError> {
        let field = self
            .profile
            .fields
            .get(name)
            .ok_or_else(|| CodecError::UnknownField(name.to_string()))?;

        match field.kind {
            FieldKind::Boolean => Ok(FieldValue::Bool(FieldValue::json_truthy(value))),
            FieldKind::Numeric => {
                FieldValue::from_json(value).ok_or_else(|| CodecError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("expected a number, got {value}"),
                })
            }
        }
    }

    /// [`Self::convert_set`] for a host JSON value
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_set_json(&self, name: &str, value: &Value) -> Result<WriteRequest, CodecError> {
        self.convert_set(name, self.field_value(name, value)?)
    }

    /// [`Self::convert_set_batch`] for a host JSON object
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_set_batch_json(
        &self,
        values: &serde_json::Map<String, Value>,
    ) -> Result<WriteRequest, CodecError> {
        let record = values
            .iter()
            .map(|(name, value)| {
                self.field_value(name, value)
                    .map(|v| (name.as_str(), v))
            })
            .collect::<Result<ConfigRecord, CodecError>>()?;
        self.convert_set_batch(&record)
    }

    /// Build one write covering several fields, in table order
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_set_batch(&self, record: &ConfigRecord) -> Result<WriteRequest, CodecError> {
        let pairs = codec::encode_batch(record, &self.profile.fields)?;
        let state = self
            .profile
            .fields
            .iter()
            .filter_map(|f| record.get(&f.name).map(|v| (f.name.as_str(), *v)))
            .collect();
        Ok(self.write_request(pairs, state))
    }

    /// Build the read for a single field
    #[allow(clippy::missing_errors_doc)]
    pub fn convert_get(&self, name: &str) -> Result<ReadRequest, CodecError> {
        let attribute_id = codec::lookup(name, &self.profile.fields)?;
        Ok(self.read_request(vec![attribute_id]))
    }

    /// Post-join plan: bindings plus a read of every configuration attribute
    #[must_use]
    pub fn configure(&self) -> ConfigurePlan {
        ConfigurePlan {
            endpoint: self.profile.endpoint,
            bind_clusters: self.profile.bind_clusters.clone(),
            read: self.read_request(self.profile.fields.attribute_ids()),
        }
    }

    /// UI descriptors for every configuration field
    #[must_use]
    pub fn exposes(&self) -> Vec<Expose> {
        let access = self.profile.access & access::ALL;
        self.profile
            .fields
            .iter()
            .map(|f| match f.kind {
                FieldKind::Numeric => Expose::Numeric {
                    name: f.name.clone(),
                    access,
                    value_min: f.domain.min,
                    value_max: f.domain.max,
                    value_step: f.domain.step,
                    unit: f.unit.clone(),
                    description: f.description.clone(),
                },
                FieldKind::Boolean => Expose::Binary {
                    name: f.name.clone(),
                    access,
                    value_on: true,
                    value_off: false,
                    description: f.description.clone(),
                },
            })
            .collect()
    }

    fn rejected_write(&self, status: WriteStatus) -> RejectedWrite {
        let field = status
            .attribute_id
            .and_then(|id| self.profile.fields.by_id(id))
            .map(|f| f.name.clone());
        RejectedWrite {
            field,
            attribute_id: status.attribute_id,
            status: status.status,
            reason: status.reason().map(Status::as_str),
        }
    }

    fn write_request(&self, pairs: Vec<(u16, i64)>, state: ConfigRecord) -> WriteRequest {
        let attributes = pairs
            .into_iter()
            .filter_map(|(attribute_id, value)| {
                self.profile.fields.by_id(attribute_id).map(|f| WireAttribute {
                    attribute_id,
                    wire_type: f.wire_type,
                    value,
                })
            })
            .collect();

        WriteRequest {
            cluster: self.profile.cluster,
            endpoint: self.profile.endpoint,
            manufacturer_code: self.profile.manufacturer_code,
            attributes,
            state,
        }
    }

    fn read_request(&self, attributes: Vec<u16>) -> ReadRequest {
        ReadRequest {
            cluster: self.profile.cluster,
            endpoint: self.profile.endpoint,
            manufacturer_code: self.profile.manufacturer_code,
            attributes,
        }
    }
}
