use alloy::rpc::types::engine::PayloadId;
use std::fmt;

/// The engine answered, but not the way the Engine API contract requires.
#[derive(Debug)]
pub enum ProtocolViolation {
    UnexpectedStatus {
        method: &'static str,
        response: String,
    },
    MissingPayloadId {
        response: String,
    },
    MissingFinalHeader {
        response: String,
    },
    MissingLatestBlock,
    UnknownPayloadVersion(PayloadId),
    EmptyChunkSequence,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::UnexpectedStatus { method, response } => {
                write!(f, "{method} status is not VALID, response: {response}")
            }
            ProtocolViolation::MissingPayloadId { response } => {
                write!(f, "PayloadId is missing, response: {response}")
            }
            ProtocolViolation::MissingFinalHeader { response } => {
                write!(f, "header missing on final chunk response: {response}")
            }
            ProtocolViolation::MissingLatestBlock => {
                write!(f, "engine could not resolve the latest block")
            }
            ProtocolViolation::UnknownPayloadVersion(payload_id) => {
                write!(f, "Unknown payload version: {payload_id}")
            }
            ProtocolViolation::EmptyChunkSequence => {
                write!(f, "cannot aggregate an empty chunk sequence")
            }
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// The remote call itself failed: connection, authentication or a malformed response.
    Transport(anyhow::Error),
    ProtocolViolation(ProtocolViolation),
}

impl EngineError {
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, EngineError::ProtocolViolation(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Transport(e) => write!(f, "Transport error: {e}"),
            EngineError::ProtocolViolation(v) => write!(f, "Protocol violation: {v}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ProtocolViolation> for EngineError {
    fn from(violation: ProtocolViolation) -> Self {
        EngineError::ProtocolViolation(violation)
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(error: anyhow::Error) -> Self {
        EngineError::Transport(error)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Transport(error.into())
    }
}
