use crate::{
    confirmation::ConfirmationProvider,
    engine::EngineApi,
    error::EngineError,
    eth::ChainHeadReader,
    payload_version::PayloadVersion,
    types::{
        AssembledBlock, BlobsBundle, ChunkPayload, ChunksEnvelope, ExecutableData,
        ExecutionPayloadEnvelope,
    },
};
use alloy::{
    primitives::{B256, Bytes},
    rpc::types::{
        Header,
        engine::{
            ForkchoiceState, ForkchoiceUpdated, PayloadAttributes, PayloadId, PayloadStatus,
            PayloadStatusEnum,
        },
    },
};
use serde_json::json;
use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    ForkchoiceUpdated {
        head: B256,
        with_attributes: bool,
    },
    GetPayload {
        method: &'static str,
        payload_id: PayloadId,
    },
    GetChunk {
        payload_id: PayloadId,
        is_final: bool,
    },
    NewPayload {
        block: ExecutableData,
        blob_hashes: Vec<B256>,
        beacon_root: B256,
        requests: Vec<Bytes>,
    },
}

/// Records every call and answers from per-method queues.
///
/// Empty queues fall back to `VALID` statuses, with a `0x03` payload id when attributes were
/// sent. Payload and chunk retrieval have no fallback and fail once their queue runs dry.
#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    forkchoice_responses: Mutex<VecDeque<ForkchoiceUpdated>>,
    payload_responses: Mutex<VecDeque<ExecutionPayloadEnvelope>>,
    chunk_responses: Mutex<VecDeque<ChunksEnvelope>>,
    new_payload_responses: Mutex<VecDeque<PayloadStatus>>,
}

impl MockEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_forkchoice_updated(&self, response: ForkchoiceUpdated) {
        self.forkchoice_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    pub fn push_get_payload(&self, response: ExecutionPayloadEnvelope) {
        self.payload_responses.lock().unwrap().push_back(response);
    }

    pub fn push_get_chunk(&self, response: ChunksEnvelope) {
        self.chunk_responses.lock().unwrap().push_back(response);
    }

    pub fn push_new_payload(&self, response: PayloadStatus) {
        self.new_payload_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl EngineApi for MockEngine {
    async fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<ForkchoiceUpdated, EngineError> {
        let with_attributes = payload_attributes.is_some();
        self.record(EngineCall::ForkchoiceUpdated {
            head: state.head_block_hash,
            with_attributes,
        });
        let scripted = self.forkchoice_responses.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| {
            forkchoice_response(
                PayloadStatusEnum::Valid,
                with_attributes.then(|| payload_id(0x03, 1)),
            )
        }))
    }

    async fn get_payload(
        &self,
        version: PayloadVersion,
        payload_id: PayloadId,
    ) -> Result<ExecutionPayloadEnvelope, EngineError> {
        self.record(EngineCall::GetPayload {
            method: version.get_payload_method(),
            payload_id,
        });
        let scripted = self.payload_responses.lock().unwrap().pop_front();
        scripted.ok_or_else(|| anyhow::anyhow!("no scripted payload").into())
    }

    async fn get_chunk(
        &self,
        payload_id: PayloadId,
        is_final: bool,
    ) -> Result<ChunksEnvelope, EngineError> {
        self.record(EngineCall::GetChunk {
            payload_id,
            is_final,
        });
        let scripted = self.chunk_responses.lock().unwrap().pop_front();
        scripted.ok_or_else(|| anyhow::anyhow!("no scripted chunks").into())
    }

    async fn new_payload(
        &self,
        block: &ExecutableData,
        blob_hashes: &[B256],
        beacon_root: B256,
        requests: &[Bytes],
    ) -> Result<PayloadStatus, EngineError> {
        self.record(EngineCall::NewPayload {
            block: block.clone(),
            blob_hashes: blob_hashes.to_vec(),
            beacon_root,
            requests: requests.to_vec(),
        });
        let scripted = self.new_payload_responses.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| PayloadStatus::from_status(PayloadStatusEnum::Valid)))
    }
}

pub struct MockHeadReader {
    pub head: B256,
    pub reads: AtomicUsize,
}

impl MockHeadReader {
    pub fn new(head: B256) -> Self {
        Self {
            head,
            reads: AtomicUsize::new(0),
        }
    }
}

impl ChainHeadReader for MockHeadReader {
    async fn latest_block_hash(&self) -> Result<B256, EngineError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.head)
    }
}

pub struct Decline;

impl ConfirmationProvider for Decline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

pub fn payload_id(version: u8, sequence: u8) -> PayloadId {
    PayloadId::new([version, 0, 0, 0, 0, 0, 0, sequence])
}

pub fn forkchoice_response(
    status: PayloadStatusEnum,
    payload_id: Option<PayloadId>,
) -> ForkchoiceUpdated {
    ForkchoiceUpdated {
        payload_status: PayloadStatus::from_status(status),
        payload_id,
    }
}

/// Chunk with one transaction per entry of `transactions` and a single blob.
pub fn chunk(index: u8, transactions: &[u8]) -> ChunkPayload {
    ChunkPayload {
        header: json!({ "index": index }),
        transactions: transactions
            .iter()
            .map(|tx| Bytes::from(vec![*tx]))
            .collect(),
        blobs_bundle: BlobsBundle {
            commitments: vec![Bytes::from(vec![index; 48])],
            proofs: vec![Bytes::from(vec![index.wrapping_add(100); 48])],
            blobs: vec![Bytes::from(vec![index.wrapping_add(200); 32])],
        },
        ..Default::default()
    }
}

pub fn chunks_envelope(
    chunks: Vec<ChunkPayload>,
    payload_id: Option<PayloadId>,
    header: Option<Header>,
) -> ChunksEnvelope {
    ChunksEnvelope {
        chunks,
        payload_id,
        header,
    }
}

pub fn terminal_header(hash: B256) -> Header {
    Header {
        hash,
        inner: alloy::consensus::Header {
            parent_hash: B256::repeat_byte(0x11),
            state_root: B256::repeat_byte(0x22),
            mix_hash: B256::repeat_byte(0x33),
            number: 10,
            gas_limit: 30_000_000,
            gas_used: 21_000,
            timestamp: 1_700_000_000,
            base_fee_per_gas: Some(7),
            blob_gas_used: Some(0x20000),
            excess_blob_gas: Some(0),
            parent_beacon_block_root: Some(B256::repeat_byte(0x44)),
            ..Default::default()
        },
        total_difficulty: None,
        size: None,
    }
}

pub fn assembled_block(block_hash: B256, blob_count: u8) -> AssembledBlock {
    let mut blobs_bundle = BlobsBundle::default();
    for index in 0..blob_count {
        blobs_bundle.extend_from(&chunk(index, &[]).blobs_bundle);
    }
    AssembledBlock {
        block: ExecutableData {
            block_hash,
            ..Default::default()
        },
        blobs_bundle,
        requests: vec![Bytes::from(vec![0x00, 0x01])],
    }
}
