//! JWT cookie login gate.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv + environment
//!          │
//!          ▼
//!   ┌──────────────┐      ┌──────────────────────────────────────────┐
//!   │    config    │─────▶│               RequestGate                │
//!   │   resolve    │      │                                          │
//!   └──────────────┘      │  /login ───────────▶ LoginHandler        │
//!                         │                        └─▶ providers     │
//!   Client Request ──────▶│  valid cookie ─────▶ next handler        │
//!                         │  otherwise ────────▶ redirect to /login  │
//!                         └──────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;

use loginsrv_gate::config::{load_config, ConfigError};
use loginsrv_gate::http::server::shutdown_signal;
use loginsrv_gate::observability::init_logging;
use loginsrv_gate::{LoginServer, ProviderRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        // clap prints help, version and usage errors itself
        Err(ConfigError::InvalidFlagSyntax(error)) => error.exit(),
        Err(error) => return Err(error.into()),
    };

    init_logging(&config)?;

    tracing::info!("loginsrv-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.bind_address(),
        success_url = %config.success_url,
        cookie_http_only = config.cookie_http_only,
        "Configuration loaded"
    );
    if config.uses_default_secret() {
        tracing::warn!("Using the built-in JWT secret; set --jwt-secret or LOGINSRV_JWT_SECRET");
    }

    let registry = ProviderRegistry::with_builtin();
    let server = LoginServer::new(config.clone(), &registry)?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
