//! Identity-provider backends.
//!
//! # Data Flow
//! ```text
//! Config.backends (BackendOption per declaration, primary first)
//!     → ProviderRegistry::build_all (look up factory by `provider`)
//!     → Vec<Box<dyn Authenticator>>, same order
//!     → LoginHandler tries each in order until one accepts
//! ```
//!
//! # Design Decisions
//! - Providers are chosen by name at construction time; an unknown name is
//!   a startup error, not a login failure
//! - Only the `simple` provider ships built in; others register a factory

pub mod simple;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::auth::UserInfo;
use crate::config::{BackendOption, BackendOptions};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no backends configured")]
    NoBackends,

    #[error("unknown provider {0:?}")]
    UnknownProvider(String),

    #[error("invalid options for provider {provider}: {reason}")]
    InvalidOptions { provider: String, reason: String },

    /// The backend could not answer, e.g. its upstream is unreachable.
    #[error("provider {provider} failed")]
    Unavailable {
        provider: String,
        #[source]
        source: tower::BoxError,
    },
}

/// Validates credentials against one configured backend.
pub trait Authenticator: Send + Sync {
    /// Provider name, as used in `provider=<name>`.
    fn provider(&self) -> &str;

    /// `Ok(None)` means the credentials were rejected. The returned
    /// [`UserInfo`] carries the identity only; the caller assigns `exp`.
    fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserInfo>, ProviderError>;
}

/// Builds an [`Authenticator`] from one backend declaration.
pub type ProviderFactory = fn(&BackendOption) -> Result<Box<dyn Authenticator>, ProviderError>;

/// Maps provider names to factories.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in providers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(simple::PROVIDER_NAME, simple::SimpleBackend::from_options);
        registry
    }

    /// Register (or replace) the factory for `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn build(&self, option: &BackendOption) -> Result<Box<dyn Authenticator>, ProviderError> {
        let factory = self
            .factories
            .get(option.provider())
            .ok_or_else(|| ProviderError::UnknownProvider(option.provider().to_string()))?;
        factory(option)
    }

    /// Build every declared backend, keeping declaration order.
    pub fn build_all(&self, options: &BackendOptions) -> Result<Vec<Box<dyn Authenticator>>, ProviderError> {
        if options.is_empty() {
            return Err(ProviderError::NoBackends);
        }
        options.iter().map(|option| self.build(option)).collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ProviderRegistry").field("providers", &names).finish()
    }
}
