//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → RequestGate (auth::gate)
//!         → login path:   LoginHandler
//!         → valid token:  bound "next" handler
//!         → otherwise:    redirect to the login path
//!     → Send to client
//! ```
//!
//! Handlers are plain values implementing [`HttpHandler`], bound at
//! construction time, so the gate can wrap any downstream service.

pub mod server;

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{HeaderValue, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

pub use server::LoginServer;

/// Result of an [`HttpHandler`]. Errors surface to whoever invoked the handler.
pub type HandlerResult = Result<Response, tower::BoxError>;

/// `303 See Other` pointing at `location`.
///
/// A location that cannot be a header value is an error, not a panic.
pub fn see_other(location: &str) -> HandlerResult {
    let location = HeaderValue::from_str(location)?;
    Ok((StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response())
}

/// A request handler that can be bound into the gate.
pub trait HttpHandler: Send + Sync {
    fn serve(&self, request: Request<Body>) -> impl Future<Output = HandlerResult> + Send;
}

/// Adapts an async function or closure into an [`HttpHandler`].
#[derive(Debug, Clone)]
pub struct HandlerFn<F>(pub F);

impl<F, Fut> HttpHandler for HandlerFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    fn serve(&self, request: Request<Body>) -> impl Future<Output = HandlerResult> + Send {
        (self.0)(request)
    }
}

impl<H: HttpHandler> HttpHandler for Arc<H> {
    fn serve(&self, request: Request<Body>) -> impl Future<Output = HandlerResult> + Send {
        (**self).serve(request)
    }
}
