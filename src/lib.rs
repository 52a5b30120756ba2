//! JWT cookie login gate.
//!
//! Resolves its configuration once from defaults, `LOGINSRV_*` environment
//! variables and command line flags, then gates every request: the login
//! path goes to the login handler, requests carrying a valid token cookie go
//! to the protected handler, everything else is redirected to log in.

pub mod auth;
pub mod config;
pub mod http;
pub mod observability;
pub mod providers;

pub use auth::{GateOutcome, RequestGate, TokenState, UserInfo};
pub use config::Config;
pub use http::{HandlerFn, HttpHandler, LoginServer};
pub use providers::ProviderRegistry;
