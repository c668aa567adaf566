use tracing::Level;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global fmt subscriber.
///
/// An explicit `level` wins over `RUST_LOG`, which wins over the `info` default.
pub fn init_logging(level: Option<Level>) {
    if let Err(e) = fmt()
        .with_env_filter(log_filter(level))
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn log_filter(level: Option<Level>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .parse_lossy(""),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    }
}
