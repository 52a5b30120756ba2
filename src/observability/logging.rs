//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format by default, text format when `text_logging` is set
//! - An unknown level falls back to `info` instead of failing startup

use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter,
};

use crate::config::Config;

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &Config) -> Result<(), TryInitError> {
    let level = parse_level(&config.log_level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.unwrap_or(LevelFilter::INFO).into()));

    let registry = tracing_subscriber::registry().with(filter);
    if config.text_logging {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    if level.is_none() {
        tracing::warn!(log_level = %config.log_level, "Unknown log level, using info");
    }
    Ok(())
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}
