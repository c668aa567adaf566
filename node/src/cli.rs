use clap::{Parser, Subcommand};
use common::utils::config::Config;
use std::num::NonZeroU32;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "cl-emulator",
    version,
    about = "Drives an execution client through block production like a consensus client would",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(
        long = "log-level",
        visible_alias = "loglevel",
        alias = "log",
        value_name = "LEVEL",
        help = "Log verbosity, overrides RUST_LOG",
        long_help = "Possible values: error, warn, info, debug, trace"
    )]
    pub log_level: Option<Level>,
    #[arg(
        long = "engine-url",
        alias = "engine.url",
        value_name = "URL",
        help = "Engine API endpoint, overrides ENGINE_RPC_URL"
    )]
    pub engine_url: Option<String>,
    #[arg(
        long = "eth-url",
        alias = "eth.url",
        value_name = "URL",
        help = "Ethereum JSON-RPC endpoint, overrides ETH_RPC_URL"
    )]
    pub eth_url: Option<String>,
    #[arg(
        long = "jwt-secret",
        aliases = ["jwt", "engine.jwt"],
        value_name = "PATH",
        help = "File with the hex encoded Engine API secret, overrides JWT_SECRET_FILE_PATH"
    )]
    pub jwt_secret: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Build blocks on top of the current head")]
    Build {
        #[arg(short = 'b', long, default_value_t = 1, help = "Number of blocks to build")]
        blocks: u32,
        #[arg(
            long = "auto-confirm",
            alias = "auto",
            help = "Commit every block without asking"
        )]
        auto_confirm: bool,
        #[arg(
            long,
            value_name = "CALLS",
            help = "Stream each block through this many engine_getChunk calls"
        )]
        chunks: Option<NonZeroU32>,
    },
}

impl Cli {
    pub fn run() -> Self {
        Self::parse()
    }

    /// Flags given on the command line take precedence over the environment.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.engine_url {
            config.engine_rpc_url = url.clone();
        }
        if let Some(url) = &self.eth_url {
            config.eth_rpc_url = url.clone();
        }
        if let Some(path) = &self.jwt_secret {
            config.jwt_secret_file_path = Some(path.clone());
        }
    }
}
