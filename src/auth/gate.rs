//! Request gate.
//!
//! # Responsibilities
//! - Hand the login path to the login handler, whatever the token state
//! - Validate the token cookie of every other request
//! - Forward authenticated requests to the bound "next" handler
//! - Redirect unauthenticated requests to the login path
//!
//! # Design Decisions
//! - Holds no mutable state; one gate serves concurrent requests
//! - Token failures never become errors, only a routing decision
//! - Errors from "next" are returned unchanged

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::auth::cookie::find_cookie;
use crate::auth::token::{TokenCodec, UserInfo};
use crate::config::Config;
use crate::http::{see_other, HandlerResult, HttpHandler};

/// Token state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// No (or an empty) token cookie.
    NoToken,
    /// Malformed, wrongly signed, wrong algorithm or expired.
    Invalid,
    Valid(UserInfo),
}

/// What the gate did with a request.
#[derive(Debug)]
pub enum GateOutcome {
    /// The login handler owns the response.
    LoginFlow(Response),
    /// The request was authenticated and passed to "next".
    Forwarded(Response),
    /// The gate answered itself; the request never reached "next".
    Intercepted(Response),
}

impl GateOutcome {
    /// Status in the host-server convention: `0` means the login handler
    /// already produced the response and the gate did not handle it.
    pub fn status(&self) -> u16 {
        match self {
            GateOutcome::LoginFlow(_) => 0,
            GateOutcome::Forwarded(response) | GateOutcome::Intercepted(response) => {
                response.status().as_u16()
            }
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, GateOutcome::Forwarded(_))
    }

    pub fn into_response(self) -> Response {
        match self {
            GateOutcome::LoginFlow(response)
            | GateOutcome::Forwarded(response)
            | GateOutcome::Intercepted(response) => response,
        }
    }
}

/// Gate in front of `next`, with `login` serving the login path.
pub struct RequestGate<N, L> {
    config: Arc<Config>,
    codec: TokenCodec,
    login: L,
    next: N,
}

impl<N, L> RequestGate<N, L>
where
    N: HttpHandler,
    L: HttpHandler,
{
    pub fn new(config: Arc<Config>, login: L, next: N) -> Self {
        let codec = TokenCodec::new(&config.jwt_secret);
        Self {
            config,
            codec,
            login,
            next,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Classify the token cookie carried by `headers`.
    pub fn token_state(&self, headers: &HeaderMap) -> TokenState {
        let token = match find_cookie(headers, &self.config.cookie_name) {
            Some(token) if !token.is_empty() => token,
            _ => return TokenState::NoToken,
        };

        match self.codec.validate(token) {
            Ok(user) => TokenState::Valid(user),
            Err(error) => {
                tracing::debug!(
                    cookie = %self.config.cookie_name,
                    reason = ?error,
                    "Rejected token"
                );
                TokenState::Invalid
            }
        }
    }

    /// Route one request.
    ///
    /// Authenticated requests reach "next" with their [`UserInfo`] attached as
    /// a request extension; method, URI, headers and body are untouched.
    pub async fn handle(&self, mut request: Request<Body>) -> Result<GateOutcome, tower::BoxError> {
        if request.uri().path() == self.config.login_path {
            let response = match self.login.serve(request).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::error!(error = %error, "Login handler failed");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            };
            return Ok(GateOutcome::LoginFlow(response));
        }

        match self.token_state(request.headers()) {
            TokenState::Valid(user) => {
                tracing::trace!(sub = %user.sub, path = %request.uri().path(), "Token accepted");
                request.extensions_mut().insert(user);
                self.next.serve(request).await.map(GateOutcome::Forwarded)
            }
            state => {
                tracing::debug!(
                    path = %request.uri().path(),
                    state = ?state,
                    "Unauthenticated request, redirecting to login"
                );
                see_other(&self.config.login_path).map(GateOutcome::Intercepted)
            }
        }
    }
}

impl<N, L> HttpHandler for RequestGate<N, L>
where
    N: HttpHandler,
    L: HttpHandler,
{
    async fn serve(&self, request: Request<Body>) -> HandlerResult {
        self.handle(request).await.map(GateOutcome::into_response)
    }
}
