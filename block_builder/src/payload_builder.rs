use crate::{
    engine::{EngineApi, METHOD_FORKCHOICE_UPDATED},
    error::{EngineError, ProtocolViolation},
    payload_version::PayloadVersion,
    types::{AssembledBlock, ChunkPayload},
};
use alloy::{
    primitives::B256,
    rpc::types::{
        Header,
        engine::{
            ForkchoiceState, ForkchoiceUpdated, PayloadAttributes, PayloadId, PayloadStatusEnum,
        },
    },
};
use std::{num::NonZeroU32, time::Duration};
use tracing::debug;

async fn forkchoice_updated<E: EngineApi>(
    engine: &E,
    head: B256,
    payload_attributes: Option<PayloadAttributes>,
) -> Result<ForkchoiceUpdated, EngineError> {
    let state = ForkchoiceState {
        head_block_hash: head,
        ..Default::default()
    };

    let response = engine.forkchoice_updated(state, payload_attributes).await?;
    if response.payload_status.status != PayloadStatusEnum::Valid {
        return Err(ProtocolViolation::UnexpectedStatus {
            method: METHOD_FORKCHOICE_UPDATED,
            response: format!("{response:?}"),
        }
        .into());
    }
    Ok(response)
}

/// Asks the engine to start building on top of `head`.
///
/// A payload id is mandatory once attributes are supplied, so its absence is an error.
pub async fn start_build<E: EngineApi>(
    engine: &E,
    head: B256,
    payload_attributes: PayloadAttributes,
) -> Result<PayloadId, EngineError> {
    let response = forkchoice_updated(engine, head, Some(payload_attributes)).await?;
    response.payload_id.ok_or_else(|| {
        ProtocolViolation::MissingPayloadId {
            response: format!("{response:?}"),
        }
        .into()
    })
}

/// Moves the head without requesting a new build.
pub async fn update_head<E: EngineApi>(engine: &E, head: B256) -> Result<(), EngineError> {
    forkchoice_updated(engine, head, None).await?;
    Ok(())
}

/// Fetches the whole block with the `engine_getPayload` method matching the payload id.
pub async fn retrieve_single<E: EngineApi>(
    engine: &E,
    payload_id: PayloadId,
) -> Result<AssembledBlock, EngineError> {
    let version = PayloadVersion::from_payload_id(&payload_id)?;
    let envelope = engine.get_payload(version, payload_id).await?;
    Ok(envelope.into())
}

/// Drains `chunk_count` chunk responses, waiting `chunk_duration` before each call.
///
/// Only the last call is marked final, and its response has to carry the header of the finished
/// block.
pub async fn retrieve_chunk_stream<E: EngineApi>(
    engine: &E,
    payload_id: PayloadId,
    chunk_count: NonZeroU32,
    chunk_duration: Duration,
) -> Result<(Vec<ChunkPayload>, Header), EngineError> {
    let mut handle = payload_id;
    let mut chunks = Vec::new();

    for index in 1..chunk_count.get() {
        tokio::time::sleep(chunk_duration).await;

        let envelope = engine.get_chunk(handle, false).await?;
        debug!(
            "Chunk call {} of {} returned {} chunks",
            index,
            chunk_count,
            envelope.chunks.len()
        );
        let Some(next_handle) = envelope.payload_id else {
            return Err(ProtocolViolation::MissingPayloadId {
                response: format!("{envelope:?}"),
            }
            .into());
        };
        handle = next_handle;
        chunks.extend(envelope.chunks);
    }

    tokio::time::sleep(chunk_duration).await;
    let mut envelope = engine.get_chunk(handle, true).await?;
    let Some(header) = envelope.header.take() else {
        return Err(ProtocolViolation::MissingFinalHeader {
            response: format!("{envelope:?}"),
        }
        .into());
    };
    chunks.extend(envelope.chunks);

    Ok((chunks, header))
}
