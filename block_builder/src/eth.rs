use crate::error::{EngineError, ProtocolViolation};
use alloy::primitives::B256;
use common::utils::rpc_client::JSONRPCClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const METHOD_CLIENT_VERSION: &str = "web3_clientVersion";
const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

pub trait ChainHeadReader {
    /// Hash of the current canonical head. Every call re-queries the node.
    fn latest_block_hash(&self) -> impl Future<Output = Result<B256, EngineError>> + Send;
}

#[derive(Deserialize)]
struct BlockHash {
    hash: Option<B256>,
}

/// Unauthenticated client for the regular Ethereum JSON-RPC endpoint.
pub struct EthClient {
    rpc_client: JSONRPCClient,
}

impl EthClient {
    pub async fn new(url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let rpc_client = JSONRPCClient::new_with_timeout(url, timeout)?;

        let version = rpc_client
            .call_method(METHOD_CLIENT_VERSION, vec![])
            .await?;
        debug!("Eth client version: {}", version);

        Ok(Self { rpc_client })
    }
}

impl ChainHeadReader for EthClient {
    async fn latest_block_hash(&self) -> Result<B256, EngineError> {
        let response = self
            .rpc_client
            .call_method(
                METHOD_GET_BLOCK_BY_NUMBER,
                vec![Value::String("latest".to_string()), Value::Bool(false)],
            )
            .await?;

        if response.is_null() {
            return Err(ProtocolViolation::MissingLatestBlock.into());
        }
        let block: BlockHash = serde_json::from_value(response)?;
        block
            .hash
            .ok_or_else(|| ProtocolViolation::MissingLatestBlock.into())
    }
}
