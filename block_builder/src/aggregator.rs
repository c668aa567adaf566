use crate::{
    error::ProtocolViolation,
    types::{AssembledBlock, BlobsBundle, ChunkPayload, ExecutableData},
};
use alloy::{primitives::U256, rpc::types::Header};
use tracing::debug;

/// Reassembles a streamed block.
///
/// Transactions, withdrawals and blobs are concatenated in chunk order. Every block level
/// field comes from `header`, the access list and the execution requests come from the last
/// chunk.
pub fn aggregate(
    chunks: &[ChunkPayload],
    header: &Header,
) -> Result<AssembledBlock, ProtocolViolation> {
    let last_chunk = chunks.last().ok_or(ProtocolViolation::EmptyChunkSequence)?;

    let transaction_count = chunks.iter().map(|chunk| chunk.transactions.len()).sum();
    let withdrawal_count = chunks.iter().map(|chunk| chunk.withdrawals.len()).sum();
    let blob_count = chunks.iter().map(|chunk| chunk.blobs_bundle.len()).sum();

    let mut chunk_headers = Vec::with_capacity(chunks.len());
    let mut transactions = Vec::with_capacity(transaction_count);
    let mut withdrawals = Vec::with_capacity(withdrawal_count);
    let mut blobs_bundle = BlobsBundle::with_capacity(blob_count);

    for chunk in chunks {
        debug!(
            "Aggregating chunk txs: {} withdrawals: {} blobs: {}",
            chunk.transactions.len(),
            chunk.withdrawals.len(),
            chunk.blobs_bundle.len()
        );
        chunk_headers.push(chunk.header.clone());
        transactions.extend_from_slice(&chunk.transactions);
        withdrawals.extend_from_slice(&chunk.withdrawals);
        blobs_bundle.extend_from(&chunk.blobs_bundle);
    }

    let inner = &header.inner;
    let block = ExecutableData {
        parent_hash: inner.parent_hash,
        fee_recipient: inner.beneficiary,
        state_root: inner.state_root,
        receipts_root: inner.receipts_root,
        logs_bloom: inner.logs_bloom,
        random: inner.mix_hash,
        number: inner.number,
        gas_limit: inner.gas_limit,
        gas_used: inner.gas_used,
        timestamp: inner.timestamp,
        extra_data: inner.extra_data.clone(),
        base_fee_per_gas: U256::from(inner.base_fee_per_gas.unwrap_or_default()),
        block_hash: header.hash,
        transactions,
        withdrawals,
        blob_gas_used: inner.blob_gas_used,
        excess_blob_gas: inner.excess_blob_gas,
        block_access_list: last_chunk.access_list.clone(),
        chunk_headers,
    };

    Ok(AssembledBlock {
        block,
        blobs_bundle,
        requests: last_chunk.requests.clone().unwrap_or_default(),
    })
}
