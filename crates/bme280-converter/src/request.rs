//! Request dispatch for the line-oriented host protocol

use anyhow::Context;
use attribute_codec::{DeviceConverter, ProfileRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Response wrapper using `serde_json::Value` for flexibility
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// One host request
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Decode an attribute report / read response `data` object
    Convert {
        #[serde(default)]
        model: Option<String>,
        data: Value,
    },
    /// Decode a raw ZCL frame
    ConvertZcl {
        #[serde(default)]
        model: Option<String>,
        frame: Vec<u8>,
    },
    /// Check a raw Write Attributes Response frame
    WriteResponse {
        #[serde(default)]
        model: Option<String>,
        frame: Vec<u8>,
    },
    /// Write one field
    Set {
        #[serde(default)]
        model: Option<String>,
        key: String,
        value: Value,
    },
    /// Write several fields in one transaction
    SetBatch {
        #[serde(default)]
        model: Option<String>,
        values: Map<String, Value>,
    },
    /// Read one field
    Get {
        #[serde(default)]
        model: Option<String>,
        key: String,
    },
    /// Post-join configuration plan
    Configure {
        #[serde(default)]
        model: Option<String>,
    },
    /// UI descriptors
    Exposes {
        #[serde(default)]
        model: Option<String>,
    },
    /// Firmware default configuration
    Defaults {
        #[serde(default)]
        model: Option<String>,
    },
    /// Supported model identifiers
    Models,
}

/// Dispatch state for one stdin session
pub struct Session {
    registry: ProfileRegistry,
    default_model: Option<String>,
    transaction_seq: u8,
}

impl Session {
    pub fn new(registry: ProfileRegistry, default_model: Option<String>) -> Self {
        Self {
            registry,
            default_model,
            transaction_seq: 0,
        }
    }

    /// Parse and answer one input line
    pub fn handle_line(&mut self, line: &str) -> ApiResponse {
        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Rejected malformed request: {}", e);
                return ApiResponse::error(format!("Invalid request: {e}"));
            }
        };

        match self.handle(request) {
            Ok(data) => ApiResponse::success(data),
            Err(e) => {
                tracing::debug!("Request failed: {:#}", e);
                ApiResponse::error(format!("{e:#}"))
            }
        }
    }

    fn handle(&mut self, request: Request) -> anyhow::Result<Value> {
        match request {
            Request::Convert { model, data } => {
                let converter = self.converter(model.as_deref())?;
                Ok(converter.convert_json(&data).to_json())
            }
            Request::ConvertZcl { model, frame } => {
                let converter = self.converter(model.as_deref())?;
                Ok(converter.convert_zcl(&frame)?.to_json())
            }
            Request::WriteResponse { model, frame } => {
                let converter = self.converter(model.as_deref())?;
                let rejected = converter.convert_write_response(&frame)?;
                Ok(json!({ "accepted": rejected.is_empty(), "rejected": rejected }))
            }
            Request::Set { model, key, value } => {
                let converter = self.converter(model.as_deref())?;
                let request = converter.convert_set_json(&key, &value)?;
                let zcl = request.to_zcl(self.next_seq())?;
                Ok(json!({
                    "write": request,
                    "payload": request.payload(),
                    "zcl": zcl,
                }))
            }
            Request::SetBatch { model, values } => {
                let converter = self.converter(model.as_deref())?;
                let request = converter.convert_set_batch_json(&values)?;
                let zcl = request.to_zcl(self.next_seq())?;
                Ok(json!({
                    "write": request,
                    "payload": request.payload(),
                    "zcl": zcl,
                }))
            }
            Request::Get { model, key } => {
                let converter = self.converter(model.as_deref())?;
                let request = converter.convert_get(&key)?;
                let zcl = request.to_zcl(self.next_seq());
                Ok(json!({ "read": request, "zcl": zcl }))
            }
            Request::Configure { model } => {
                let converter = self.converter(model.as_deref())?;
                let plan = converter.configure();
                let zcl = plan.read.to_zcl(self.next_seq());
                Ok(json!({ "plan": plan, "zcl": zcl }))
            }
            Request::Exposes { model } => {
                let converter = self.converter(model.as_deref())?;
                Ok(serde_json::to_value(converter.exposes())?)
            }
            Request::Defaults { model } => {
                let converter = self.converter(model.as_deref())?;
                Ok(converter.profile().defaults().to_json())
            }
            Request::Models => Ok(json!(self.registry.models())),
        }
    }

    fn converter(&self, model: Option<&str>) -> anyhow::Result<DeviceConverter> {
        let model = model
            .or(self.default_model.as_deref())
            .context("No model given and CONVERTER_MODEL is not set")?;
        Ok(DeviceConverter::new(self.registry.resolve(model)?))
    }

    fn next_seq(&mut self) -> u8 {
        self.transaction_seq = self.transaction_seq.wrapping_add(1);
        self.transaction_seq
    }
}

/// Answer every line of `input` on `output` until end of input
///
/// Each line gets exactly one response, including lines that are not UTF-8.
/// Only I/O errors end the loop early.
#[allow(clippy::missing_errors_doc)]
pub async fn serve<R, W>(session: &mut Session, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.split(b'\n');

    while let Some(raw) = lines.next_segment().await? {
        let response = match String::from_utf8(raw) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                session.handle_line(line)
            }
            Err(e) => {
                tracing::warn!("Rejected non UTF-8 request line: {}", e);
                ApiResponse::error(format!("Invalid request: {e}"))
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        output.write_all(&out).await?;
        output.flush().await?;
    }

    Ok(())
}
