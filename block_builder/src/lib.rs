//! Consensus layer side of block production: asks an execution engine to build a block on top
//! of the current head, fetches it whole or as a stream of chunks, and commits it as the new head.

pub mod aggregator;
pub mod attributes;
pub mod committer;
pub mod confirmation;
pub mod engine;
pub mod error;
pub mod eth;
pub mod payload_builder;
pub mod payload_version;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use confirmation::{AutoConfirm, ConfirmationProvider, StdinPrompt};
pub use engine::{EngineApi, EngineClient};
pub use error::{EngineError, ProtocolViolation};
pub use eth::{ChainHeadReader, EthClient};
pub use pipeline::{BlockBuilder, BuildOutcome, BuildStage, RetrievalMode};
