use anyhow::Error;
use std::{fmt, time::Duration};
use tracing::warn;

const ENGINE_RPC_URL: &str = "ENGINE_RPC_URL";
const ETH_RPC_URL: &str = "ETH_RPC_URL";
const JWT_SECRET_FILE_PATH: &str = "JWT_SECRET_FILE_PATH";
const RPC_TIMEOUT_MS: &str = "RPC_TIMEOUT_MS";
const BLOCK_BUILD_DURATION_MS: &str = "BLOCK_BUILD_DURATION_MS";
const CHUNK_DURATION_MS: &str = "CHUNK_DURATION_MS";
const INTER_BLOCK_DELAY_MS: &str = "INTER_BLOCK_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub engine_rpc_url: String,
    pub eth_rpc_url: String,
    pub jwt_secret_file_path: Option<String>,
    pub rpc_timeout: Duration,
    pub block_build_duration: Duration,
    pub chunk_duration: Duration,
    pub inter_block_delay: Duration,
}

impl Config {
    /// Reads the configuration from the environment, loading a `.env` file first if one exists.
    pub fn read_env_variables() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let engine_rpc_url =
            lookup(ENGINE_RPC_URL).unwrap_or("http://127.0.0.1:8551".to_string());
        let eth_rpc_url = lookup(ETH_RPC_URL).unwrap_or("http://127.0.0.1:8545".to_string());

        let jwt_secret_file_path = lookup(JWT_SECRET_FILE_PATH).filter(|path| !path.is_empty());
        if jwt_secret_file_path.is_none() {
            warn!(
                "No {} set, engine requests will be sent without authentication",
                JWT_SECRET_FILE_PATH
            );
        }

        let read_millis = |key: &str, default: &str| -> Result<Duration, Error> {
            lookup(key)
                .unwrap_or(default.to_string())
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| anyhow::anyhow!("{} must be a number: {}", key, e))
        };

        Ok(Config {
            engine_rpc_url,
            eth_rpc_url,
            jwt_secret_file_path,
            rpc_timeout: read_millis(RPC_TIMEOUT_MS, "10000")?,
            block_build_duration: read_millis(BLOCK_BUILD_DURATION_MS, "1000")?,
            chunk_duration: read_millis(CHUNK_DURATION_MS, "500")?,
            inter_block_delay: read_millis(INTER_BLOCK_DELAY_MS, "5000")?,
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "engine rpc url: {}", self.engine_rpc_url)?;
        writeln!(f, "eth rpc url: {}", self.eth_rpc_url)?;
        writeln!(
            f,
            "jwt secret file: {}",
            self.jwt_secret_file_path.as_deref().unwrap_or("<none>")
        )?;
        writeln!(f, "rpc timeout: {}ms", self.rpc_timeout.as_millis())?;
        writeln!(
            f,
            "block build duration: {}ms",
            self.block_build_duration.as_millis()
        )?;
        writeln!(f, "chunk duration: {}ms", self.chunk_duration.as_millis())?;
        write!(
            f,
            "inter block delay: {}ms",
            self.inter_block_delay.as_millis()
        )
    }
}
