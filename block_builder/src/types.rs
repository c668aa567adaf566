use alloy::{
    eips::eip4895::Withdrawal,
    primitives::{Address, B256, Bloom, Bytes, U256},
    rpc::types::{Header, engine::PayloadId},
};
use serde::{Deserialize, Serialize};

/// Per-chunk header as produced by the engine. Kept opaque: it is only displayed, never hashed.
pub type ChunkHeader = serde_json::Value;

/// Block level access list. Kept opaque and passed back to the engine untouched.
pub type BlockAccessList = serde_json::Value;

/// Executable block data exchanged through `engine_getPayload*` and `engine_newPayloadV5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableData {
    pub parent_hash: B256,
    pub fee_recipient: Address,
    pub state_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    #[serde(rename = "prevRandao")]
    pub random: B256,
    #[serde(with = "alloy::serde::quantity")]
    pub number: u64,
    #[serde(with = "alloy::serde::quantity")]
    pub gas_limit: u64,
    #[serde(with = "alloy::serde::quantity")]
    pub gas_used: u64,
    #[serde(with = "alloy::serde::quantity")]
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub base_fee_per_gas: U256,
    pub block_hash: B256,
    pub transactions: Vec<Bytes>,
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy::serde::quantity::opt"
    )]
    pub blob_gas_used: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy::serde::quantity::opt"
    )]
    pub excess_blob_gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_access_list: Option<BlockAccessList>,
    #[serde(default, rename = "chunks")]
    pub chunk_headers: Vec<ChunkHeader>,
}

/// Blob sidecar data. The three lists are indexed in parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobsBundle {
    #[serde(default)]
    pub commitments: Vec<Bytes>,
    #[serde(default)]
    pub proofs: Vec<Bytes>,
    #[serde(default)]
    pub blobs: Vec<Bytes>,
}

impl BlobsBundle {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commitments: Vec::with_capacity(capacity),
            proofs: Vec::with_capacity(capacity),
            blobs: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.commitments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commitments.is_empty()
    }

    pub fn extend_from(&mut self, other: &BlobsBundle) {
        self.commitments.extend_from_slice(&other.commitments);
        self.proofs.extend_from_slice(&other.proofs);
        self.blobs.extend_from_slice(&other.blobs);
    }
}

/// Response of the single-shot `engine_getPayload*` methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayloadEnvelope {
    pub execution_payload: ExecutableData,
    #[serde(default)]
    pub block_value: U256,
    #[serde(default)]
    pub blobs_bundle: BlobsBundle,
    #[serde(default)]
    pub execution_requests: Option<Vec<Bytes>>,
    #[serde(default)]
    pub should_override_builder: bool,
}

/// One incremental piece of a block under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPayload {
    #[serde(default)]
    pub header: ChunkHeader,
    #[serde(default)]
    pub transactions: Vec<Bytes>,
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
    #[serde(default)]
    pub blobs_bundle: BlobsBundle,
    #[serde(default)]
    pub access_list: Option<BlockAccessList>,
    /// Only meaningful on the last chunk of a block.
    #[serde(default)]
    pub requests: Option<Vec<Bytes>>,
}

/// Response of `engine_getChunk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunksEnvelope {
    #[serde(default)]
    pub chunks: Vec<ChunkPayload>,
    /// Handle for the next `engine_getChunk` call. Absent on the final response.
    #[serde(default)]
    pub payload_id: Option<PayloadId>,
    /// Header of the finished block. Present on the final response.
    #[serde(default)]
    pub header: Option<Header>,
}

/// A block ready to be handed to `engine_newPayloadV5`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledBlock {
    pub block: ExecutableData,
    pub blobs_bundle: BlobsBundle,
    pub requests: Vec<Bytes>,
}

impl From<ExecutionPayloadEnvelope> for AssembledBlock {
    fn from(envelope: ExecutionPayloadEnvelope) -> Self {
        Self {
            block: envelope.execution_payload,
            blobs_bundle: envelope.blobs_bundle,
            requests: envelope.execution_requests.unwrap_or_default(),
        }
    }
}

/// Client identification exchanged through `engine_getClientVersionV1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientVersion {
    pub code: String,
    pub name: String,
    pub version: String,
    pub commit: String,
}

impl ClientVersion {
    pub fn this_client() -> Self {
        Self {
            code: "CE".to_string(),
            name: "cl-emulator".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: "0x00000000".to_string(),
        }
    }
}
