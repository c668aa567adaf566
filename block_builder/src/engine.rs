use crate::{
    error::EngineError,
    payload_version::PayloadVersion,
    types::{ChunksEnvelope, ClientVersion, ExecutableData, ExecutionPayloadEnvelope},
};
use alloy::{
    primitives::{B256, Bytes},
    rpc::types::engine::{
        ForkchoiceState, ForkchoiceUpdated, PayloadAttributes, PayloadId, PayloadStatus,
    },
};
use common::utils::rpc_client::JSONRPCClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub const METHOD_GET_CLIENT_VERSION: &str = "engine_getClientVersionV1";
pub const METHOD_FORKCHOICE_UPDATED: &str = "engine_forkchoiceUpdatedV3";
pub const METHOD_GET_CHUNK: &str = "engine_getChunk";
pub const METHOD_NEW_PAYLOAD: &str = "engine_newPayloadV5";

/// Engine API surface needed to build and import blocks.
pub trait EngineApi {
    fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> impl Future<Output = Result<ForkchoiceUpdated, EngineError>> + Send;

    fn get_payload(
        &self,
        version: PayloadVersion,
        payload_id: PayloadId,
    ) -> impl Future<Output = Result<ExecutionPayloadEnvelope, EngineError>> + Send;

    fn get_chunk(
        &self,
        payload_id: PayloadId,
        is_final: bool,
    ) -> impl Future<Output = Result<ChunksEnvelope, EngineError>> + Send;

    fn new_payload(
        &self,
        block: &ExecutableData,
        blob_hashes: &[B256],
        beacon_root: B256,
        requests: &[Bytes],
    ) -> impl Future<Output = Result<PayloadStatus, EngineError>> + Send;
}

/// Engine API client over an authenticated JSON-RPC connection.
pub struct EngineClient {
    rpc_client: JSONRPCClient,
}

impl EngineClient {
    /// Connects and exchanges client versions with the engine.
    pub async fn new(
        url: &str,
        timeout: Duration,
        jwt_secret: Option<[u8; 32]>,
    ) -> Result<Self, EngineError> {
        let rpc_client = match jwt_secret {
            Some(secret) => JSONRPCClient::new_with_timeout_and_jwt(url, timeout, secret)?,
            None => JSONRPCClient::new_with_timeout(url, timeout)?,
        };
        let client = Self { rpc_client };

        let versions = client.client_version().await?;
        debug!("Engine API client version: {:?}", versions);

        Ok(client)
    }

    pub async fn client_version(&self) -> Result<Vec<ClientVersion>, EngineError> {
        self.call(
            METHOD_GET_CLIENT_VERSION,
            vec![serde_json::to_value(ClientVersion::this_client())?],
        )
        .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, EngineError> {
        let response = self.rpc_client.call_method(method, params).await?;
        serde_json::from_value(response).map_err(|e| {
            EngineError::Transport(anyhow::anyhow!("{method}: unexpected response: {e}"))
        })
    }
}

impl EngineApi for EngineClient {
    async fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<ForkchoiceUpdated, EngineError> {
        let response: ForkchoiceUpdated = self
            .call(
                METHOD_FORKCHOICE_UPDATED,
                vec![
                    serde_json::to_value(&state)?,
                    serde_json::to_value(&payload_attributes)?,
                ],
            )
            .await?;

        info!(
            "{} head: {} status: {} latestValidHash: {:?} payloadId: {:?}",
            METHOD_FORKCHOICE_UPDATED,
            state.head_block_hash,
            response.payload_status.status,
            response.payload_status.latest_valid_hash,
            response.payload_id
        );
        Ok(response)
    }

    async fn get_payload(
        &self,
        version: PayloadVersion,
        payload_id: PayloadId,
    ) -> Result<ExecutionPayloadEnvelope, EngineError> {
        let method = version.get_payload_method();
        let envelope: ExecutionPayloadEnvelope = self
            .call(method, vec![serde_json::to_value(payload_id)?])
            .await?;

        let payload = &envelope.execution_payload;
        info!(
            "{} number: {} hash: {} parent: {} txCount: {} blobCount: {} chunkCount: {}",
            method,
            payload.number,
            payload.block_hash,
            payload.parent_hash,
            payload.transactions.len(),
            envelope.blobs_bundle.blobs.len(),
            payload.chunk_headers.len()
        );
        Ok(envelope)
    }

    async fn get_chunk(
        &self,
        payload_id: PayloadId,
        is_final: bool,
    ) -> Result<ChunksEnvelope, EngineError> {
        let envelope: ChunksEnvelope = self
            .call(
                METHOD_GET_CHUNK,
                vec![serde_json::to_value(payload_id)?, Value::Bool(is_final)],
            )
            .await?;

        info!(
            "{} payloadId: {} final: {} chunks: {} nextPayloadId: {:?} header: {:?}",
            METHOD_GET_CHUNK,
            payload_id,
            is_final,
            envelope.chunks.len(),
            envelope.payload_id,
            envelope.header.as_ref().map(|header| header.hash)
        );
        Ok(envelope)
    }

    async fn new_payload(
        &self,
        block: &ExecutableData,
        blob_hashes: &[B256],
        beacon_root: B256,
        requests: &[Bytes],
    ) -> Result<PayloadStatus, EngineError> {
        let status: PayloadStatus = self
            .call(
                METHOD_NEW_PAYLOAD,
                vec![
                    serde_json::to_value(block)?,
                    serde_json::to_value(blob_hashes)?,
                    serde_json::to_value(beacon_root)?,
                    serde_json::to_value(requests)?,
                ],
            )
            .await?;

        info!(
            "{} status: {} latestValidHash: {:?}",
            METHOD_NEW_PAYLOAD, status.status, status.latest_valid_hash
        );
        Ok(status)
    }
}
