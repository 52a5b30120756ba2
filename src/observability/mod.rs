//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (JSON or text to stdout)
//!
//! Per request:
//!     → x-request-id set and propagated (http::server)
//!     → TraceLayer span around the gate
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Secrets and tokens are never logged

pub mod logging;

pub use logging::init_logging;
