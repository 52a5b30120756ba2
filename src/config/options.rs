//! Backend option grammar.
//!
//! # Responsibilities
//! - Parse one `key=value[,key=value...]` declaration into a [`BackendOption`]
//! - Enforce that every declaration names its `provider`
//! - Accumulate repeated declarations in order ([`BackendOptions`])
//!
//! # Design Decisions
//! - Splits on `,` first, then on the first `=` of each segment, so values may
//!   contain `=` but never `,`
//! - Keys are unique per declaration; a repeated key keeps the last value
//! - A failed [`BackendOptions::set`] leaves the collected list untouched

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::loader::ConfigError;

/// Key every backend declaration must carry.
pub const PROVIDER_KEY: &str = "provider";

/// One identity-provider instantiation, e.g. `provider=simple,bob=secret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOption {
    entries: BTreeMap<String, String>,
}

impl BackendOption {
    /// Create an option for `provider` with no further parameters.
    pub fn new(provider: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PROVIDER_KEY.to_string(), provider.into());
        Self { entries }
    }

    /// Add or replace a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Name of the provider backing this option.
    pub fn provider(&self) -> &str {
        self.entries
            .get(PROVIDER_KEY)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Look up a single parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All key/value pairs, `provider` included, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Provider-specific parameters (everything except `provider`).
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(key, _)| *key != PROVIDER_KEY)
    }

    /// Number of entries, `provider` included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for BackendOption {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut entries = BTreeMap::new();
        for segment in raw.split(',') {
            let (key, value) = segment
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| ConfigError::MalformedOption {
                    segment: segment.to_string(),
                })?;
            entries.insert(key.to_string(), value.to_string());
        }

        if !entries.contains_key(PROVIDER_KEY) {
            return Err(ConfigError::MissingProvider {
                keys: entries.into_keys().collect(),
            });
        }

        Ok(Self { entries })
    }
}

/// Ordered list of backend declarations.
///
/// Backs the repeatable `--backend` flag and the environment merger: every
/// successful [`set`](Self::set) appends one entry. The first entry is the
/// primary backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendOptions {
    options: Vec<BackendOption>,
}

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `raw` and append it.
    ///
    /// Blank input means nothing was declared and is accepted without
    /// appending. On error the list is unchanged and the parser's error is
    /// returned as-is.
    pub fn set(&mut self, raw: &str) -> Result<(), ConfigError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let option = raw.parse()?;
        self.options.push(option);
        Ok(())
    }

    /// Snapshot of the collected options, in declaration order.
    pub fn value(&self) -> &[BackendOption] {
        &self.options
    }

    /// The first declared backend, if any.
    pub fn primary(&self) -> Option<&BackendOption> {
        self.options.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BackendOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl FromIterator<BackendOption> for BackendOptions {
    fn from_iter<I: IntoIterator<Item = BackendOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BackendOptions {
    type Item = &'a BackendOption;
    type IntoIter = std::slice::Iter<'a, BackendOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
