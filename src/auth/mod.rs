//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → gate.rs (login path? token cookie state?)
//!         → cookie.rs (find the configured cookie)
//!         → token.rs (signature, algorithm, expiry)
//!     → login.rs (credentials → providers → token cookie)
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything but a valid token is unauthenticated
//! - Token validation is pure computation, no I/O on the request path
//! - Validation failures are not distinguished towards the client

pub mod cookie;
pub mod gate;
pub mod login;
pub mod token;

pub use gate::{GateOutcome, RequestGate, TokenState};
pub use login::LoginHandler;
pub use token::{TokenCodec, TokenError, UserInfo};
