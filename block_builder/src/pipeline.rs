use crate::{
    aggregator::aggregate,
    attributes::{create_random_payload_attributes, current_timestamp},
    committer::commit,
    confirmation::ConfirmationProvider,
    engine::EngineApi,
    error::EngineError,
    eth::ChainHeadReader,
    payload_builder::{retrieve_chunk_stream, retrieve_single, start_build},
};
use alloy::primitives::B256;
use rand::RngCore;
use serde::Serialize;
use std::{fmt, num::NonZeroU32, time::Duration};
use tracing::{debug, error, info};

const CONFIRMATION_PROMPT: &str = "Update head of the chain?";

/// How the finished block is fetched from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Wait `build_duration`, then fetch the block with one `engine_getPayload` call.
    Single { build_duration: Duration },
    /// Stream the block through `chunk_count` `engine_getChunk` calls, `chunk_duration` apart.
    Chunked {
        chunk_count: NonZeroU32,
        chunk_duration: Duration,
    },
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalMode::Single { build_duration } => {
                write!(f, "single payload after {}ms", build_duration.as_millis())
            }
            RetrievalMode::Chunked {
                chunk_count,
                chunk_duration,
            } => write!(
                f,
                "{} chunk calls every {}ms",
                chunk_count,
                chunk_duration.as_millis()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BuildStage {
    Idle,
    HeadFetched,
    BuildStarted,
    PayloadRetrieved,
    ChunkStreaming,
    Aggregated,
    PendingConfirmation,
    Committed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Committed(B256),
    /// The operator declined to commit. The built block is dropped.
    Aborted,
}

/// Drives one block at a time through head fetch, build, retrieval, confirmation and commit.
pub struct BlockBuilder<E, H, C, R> {
    engine: E,
    head_reader: H,
    confirmation: C,
    rng: R,
    mode: RetrievalMode,
    stage: BuildStage,
}

impl<E, H, C, R> BlockBuilder<E, H, C, R>
where
    E: EngineApi,
    H: ChainHeadReader,
    C: ConfirmationProvider,
    R: RngCore,
{
    pub fn new(engine: E, head_reader: H, confirmation: C, rng: R, mode: RetrievalMode) -> Self {
        Self {
            engine,
            head_reader,
            confirmation,
            rng,
            mode,
            stage: BuildStage::Idle,
        }
    }

    fn set_stage(&mut self, stage: BuildStage) {
        debug!("Build stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Last stage reached. After a failed attempt it is the stage the error happened in.
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    pub async fn build_block(&mut self) -> Result<BuildOutcome, EngineError> {
        self.set_stage(BuildStage::Idle);

        let head = self.head_reader.latest_block_hash().await?;
        self.set_stage(BuildStage::HeadFetched);

        let attributes = create_random_payload_attributes(&mut self.rng, current_timestamp());
        let attributes_beacon_root = attributes.parent_beacon_block_root.unwrap_or_default();
        let payload_id = start_build(&self.engine, head, attributes).await?;
        self.set_stage(BuildStage::BuildStarted);

        let (assembled, beacon_root) = match self.mode {
            RetrievalMode::Single { build_duration } => {
                tokio::time::sleep(build_duration).await;
                let assembled = retrieve_single(&self.engine, payload_id).await?;
                self.set_stage(BuildStage::PayloadRetrieved);
                log_json("Chunks", &assembled.block.chunk_headers);
                (assembled, attributes_beacon_root)
            }
            RetrievalMode::Chunked {
                chunk_count,
                chunk_duration,
            } => {
                self.set_stage(BuildStage::ChunkStreaming);
                let (chunks, header) =
                    retrieve_chunk_stream(&self.engine, payload_id, chunk_count, chunk_duration)
                        .await?;
                log_json("Block header", &header);
                let assembled = aggregate(&chunks, &header)?;
                self.set_stage(BuildStage::Aggregated);
                (
                    assembled,
                    header.inner.parent_beacon_block_root.unwrap_or_default(),
                )
            }
        };

        self.set_stage(BuildStage::PendingConfirmation);
        if !self.confirmation.confirm(CONFIRMATION_PROMPT) {
            info!(
                "Head update declined, dropping block {}",
                assembled.block.block_hash
            );
            self.set_stage(BuildStage::Aborted);
            return Ok(BuildOutcome::Aborted);
        }

        let block_hash = commit(&self.engine, &assembled, beacon_root).await?;
        self.set_stage(BuildStage::Committed);
        Ok(BuildOutcome::Committed(block_hash))
    }
}

fn log_json<T: Serialize>(prefix: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => info!("{}\n{}", prefix, json),
        Err(e) => error!("Error serializing {} to json: {}", prefix, e),
    }
}
