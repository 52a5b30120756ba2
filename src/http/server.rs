//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gate as fallback for every path
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Shut down gracefully

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::{LoginHandler, RequestGate, UserInfo};
use crate::config::Config;
use crate::http::{HandlerFn, HandlerResult, HttpHandler};
use crate::providers::{ProviderError, ProviderRegistry};

/// HTTP server running the gate in front of a protected handler.
pub struct LoginServer {
    router: Router,
    config: Arc<Config>,
}

impl LoginServer {
    /// Gate the built-in [`current_user`] handler.
    pub fn new(config: Arc<Config>, registry: &ProviderRegistry) -> Result<Self, ProviderError> {
        Self::with_next(config, registry, HandlerFn(current_user))
    }

    /// Gate `next`.
    pub fn with_next<N>(config: Arc<Config>, registry: &ProviderRegistry, next: N) -> Result<Self, ProviderError>
    where
        N: HttpHandler + 'static,
    {
        let login = LoginHandler::new(config.clone(), registry)?;
        let gate = Arc::new(RequestGate::new(config.clone(), login, next));

        let providers: Vec<&str> = config.backends.iter().map(|b| b.provider()).collect();
        tracing::info!(
            backends = ?providers,
            cookie = %config.cookie_name,
            login_path = %config.login_path,
            "Gate configured"
        );

        Ok(Self {
            router: Self::build_router(gate),
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<G>(gate: Arc<G>) -> Router
    where
        G: HttpHandler + 'static,
    {
        Router::new()
            .fallback(gate_handler::<G>)
            .with_state(gate)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

async fn gate_handler<G>(State(gate): State<Arc<G>>, request: Request<Body>) -> Response
where
    G: HttpHandler + 'static,
{
    match gate.serve(request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(error = %error, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Protected handler answering with the authenticated user's claims.
pub async fn current_user(request: Request<Body>) -> HandlerResult {
    Ok(match request.extensions().get::<UserInfo>() {
        Some(user) => Json(user.clone()).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    })
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(error) => {
            tracing::error!(error = %error, "Failed to listen for Ctrl+C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
