mod cli;

use anyhow::Error;
use block_builder::{
    AutoConfirm, BlockBuilder, BuildOutcome, ConfirmationProvider, EngineClient, EthClient,
    RetrievalMode, StdinPrompt,
};
use cli::{Cli, Command};
use common::utils::{config::Config, file_operations::read_jwt_secret};
use rand::{SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::run();
    common::utils::logging::init_logging(cli.log_level);

    info!("🚀 Starting CL emulator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::read_env_variables()?;
    cli.apply_to(&mut config);
    info!("Config:\n{}", config);

    let cancel_token = CancellationToken::new();
    tokio::spawn(handle_interrupts(cancel_token.clone()));

    let result = match cli.command {
        Command::Build {
            blocks,
            auto_confirm,
            chunks,
        } => {
            let mode = match chunks {
                Some(chunk_count) => RetrievalMode::Chunked {
                    chunk_count,
                    chunk_duration: config.chunk_duration,
                },
                None => RetrievalMode::Single {
                    build_duration: config.block_build_duration,
                },
            };
            if auto_confirm {
                build_blocks(&config, AutoConfirm, mode, blocks, cancel_token).await
            } else {
                build_blocks(&config, StdinPrompt, mode, blocks, cancel_token).await
            }
        }
    };

    if let Err(e) = &result {
        error!("Failed to build blocks: {}", e);
    }
    result
}

async fn build_blocks<C: ConfirmationProvider>(
    config: &Config,
    confirmation: C,
    mode: RetrievalMode,
    blocks: u32,
    cancel_token: CancellationToken,
) -> Result<(), Error> {
    let jwt_secret = config
        .jwt_secret_file_path
        .as_deref()
        .map(read_jwt_secret)
        .transpose()?;

    let engine = EngineClient::new(&config.engine_rpc_url, config.rpc_timeout, jwt_secret)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create engine client: {}", e))?;
    let eth = EthClient::new(&config.eth_rpc_url, config.rpc_timeout)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create eth client: {}", e))?;

    let mut builder = BlockBuilder::new(engine, eth, confirmation, StdRng::from_os_rng(), mode);
    info!("Building {} blocks, retrieval: {}", blocks, builder.mode());

    for index in 1..=blocks {
        info!("Building block {}/{}", index, blocks);
        let outcome = builder.build_block().await.map_err(|e| {
            anyhow::anyhow!(
                "Block {}/{} failed at stage {}: {}",
                index,
                blocks,
                builder.stage(),
                e
            )
        })?;
        match outcome {
            BuildOutcome::Committed(hash) => {
                info!("✅ Block {}/{} committed: {}", index, blocks, hash)
            }
            BuildOutcome::Aborted => info!("Block {}/{} not committed", index, blocks),
        }

        if index < blocks && !wait_for_next_block(config.inter_block_delay, &cancel_token).await {
            info!("👋 Stopped after {} of {} blocks", index, blocks);
            break;
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    StopAfterBlock,
    Exit,
}

/// First Ctrl+C asks for a clean stop, any further one ends the process.
fn on_interrupt(cancel_token: &CancellationToken) -> Interrupt {
    if cancel_token.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel_token.cancel();
        Interrupt::StopAfterBlock
    }
}

async fn handle_interrupts(cancel_token: CancellationToken) {
    while tokio::signal::ctrl_c().await.is_ok() {
        match on_interrupt(&cancel_token) {
            Interrupt::StopAfterBlock => {
                info!(
                    "Received Ctrl+C, stopping after the current block. \
                     Press Ctrl+C again to exit now"
                );
            }
            Interrupt::Exit => {
                info!("👋 Received Ctrl+C again, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    }
}

/// Sleeps for the pacing delay. Returns false when the run was cancelled instead.
async fn wait_for_next_block(delay: Duration, cancel_token: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => !cancel_token.is_cancelled(),
        _ = cancel_token.cancelled() => false,
    }
}
