//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled-in defaults (schema.rs)
//!     → env.rs (LOGINSRV_* overrides, LOGINSRV_BACKEND[_<NAME>] merge)
//!     → loader.rs (command line flags, --backend replaces env backends)
//!     → options.rs (key=value[,key=value] grammar for every backend)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//!     → shared via Arc with the gate and the login handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; resolution runs once at startup
//! - Any resolution error is fatal, there is no best-effort config
//! - The environment is passed in as a snapshot, never read mid-resolution

pub mod env;
pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use env::Environment;
pub use loader::{load_config, resolve, ConfigError};
pub use options::{BackendOption, BackendOptions, PROVIDER_KEY};
pub use schema::Config;
pub use validation::ValidationError;
