use crate::error::ProtocolViolation;
use alloy::rpc::types::engine::PayloadId;

/// Engine API version a payload id was minted under, encoded in its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PayloadVersion {
    V1,
    V2,
    V3,
    V4,
}

impl PayloadVersion {
    pub fn from_payload_id(payload_id: &PayloadId) -> Result<Self, ProtocolViolation> {
        match payload_id.0[0] {
            0x01 => Ok(PayloadVersion::V1),
            0x02 => Ok(PayloadVersion::V2),
            0x03 => Ok(PayloadVersion::V3),
            0x04 => Ok(PayloadVersion::V4),
            _ => Err(ProtocolViolation::UnknownPayloadVersion(*payload_id)),
        }
    }

    /// Highest `engine_getPayload` method able to serve a payload of this version.
    pub fn get_payload_method(&self) -> &'static str {
        match self {
            PayloadVersion::V1 => "engine_getPayloadV1",
            PayloadVersion::V2 => "engine_getPayloadV2",
            PayloadVersion::V3 => "engine_getPayloadV5",
            PayloadVersion::V4 => "engine_getPayloadV6",
        }
    }
}
