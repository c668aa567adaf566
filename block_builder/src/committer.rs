use crate::{
    engine::{EngineApi, METHOD_FORKCHOICE_UPDATED, METHOD_NEW_PAYLOAD},
    error::{EngineError, ProtocolViolation},
    payload_builder::update_head,
    types::AssembledBlock,
};
use alloy::{
    eips::eip4844::kzg_to_versioned_hash,
    primitives::{B256, Bytes},
    rpc::types::engine::PayloadStatusEnum,
};
use tracing::info;

/// Version-1 blob hashes, one per commitment and in the same order.
pub fn blob_versioned_hashes(commitments: &[Bytes]) -> Vec<B256> {
    commitments
        .iter()
        .map(|commitment| kzg_to_versioned_hash(commitment))
        .collect()
}

/// Imports `assembled` and makes it the new head.
///
/// Anything but a `VALID` import status fails the commit, and in that case no forkchoice update
/// is sent.
pub async fn commit<E: EngineApi>(
    engine: &E,
    assembled: &AssembledBlock,
    beacon_root: B256,
) -> Result<B256, EngineError> {
    let block_hash = assembled.block.block_hash;
    info!("Updating head of the chain to {}", block_hash);

    let blob_hashes = blob_versioned_hashes(&assembled.blobs_bundle.commitments);
    let status = engine
        .new_payload(
            &assembled.block,
            &blob_hashes,
            beacon_root,
            &assembled.requests,
        )
        .await?;
    if status.status != PayloadStatusEnum::Valid {
        return Err(ProtocolViolation::UnexpectedStatus {
            method: METHOD_NEW_PAYLOAD,
            response: format!("{status:?}"),
        }
        .into());
    }

    update_head(engine, block_hash).await?;
    Ok(block_hash)
}
