//! Inbound uplink events as delivered by the network server integration.
//!
//! The layout follows The Things Network v2 uplink messages:
//!
//! ```json
//! { "dev_id": "paxcounter-01", "port": 9, "payload_raw": "BQ==",
//!   "metadata": { "time": "2019-10-04T11:33:05.123456789Z",
//!                 "gateways": [ { "gtw_id": "eui-b827ebfffe000001",
//!                                 "time": "2019-10-04T11:33:05.012Z" } ] } }
//! ```

use anyhow::{anyhow, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkEvent {
    pub dev_id: String,
    #[serde(default)]
    pub port: Option<u8>,
    pub payload_raw: RawPayload,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Time the network server received the uplink.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub gateways: Vec<GatewayMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMetadata {
    pub gtw_id: String,
    /// Reception time reported by the gateway. Absent for gateways without a time source.
    #[serde(default)]
    pub time: Option<String>,
}

/// Uplink payload bytes in any of the encodings integrations hand us.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
    /// Base64 text, as sent by TTN.
    Base64(String),
    Bytes(Vec<u8>),
    /// Node-RED `Buffer` serialized to JSON.
    Buffer {
        #[serde(rename = "type")]
        kind: String,
        data: Vec<u8>,
    },
}

impl RawPayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            RawPayload::Base64(text) => base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|e| anyhow!("Invalid base64 payload '{}': {}", text, e)),
            RawPayload::Bytes(bytes) => Ok(bytes.clone()),
            RawPayload::Buffer { data, .. } => Ok(data.clone()),
        }
    }
}

impl UplinkEvent {
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
