//! Environment variable overrides.
//!
//! # Responsibilities
//! - Snapshot the process environment once, preserving its order
//! - Apply `LOGINSRV_*` scalar overrides onto a [`Config`]
//! - Merge `LOGINSRV_BACKEND` and `LOGINSRV_BACKEND_<NAME>` into backend options
//!
//! # Design Decisions
//! - Resolution reads an [`Environment`] value, never the live process
//!   environment, so it is deterministic and testable
//! - Empty values count as unset
//! - Named backends follow the snapshot order (the order variables appear in
//!   the process environment); the unnamed `LOGINSRV_BACKEND` always comes first

use crate::config::loader::{parse_bool, ConfigError};
use crate::config::options::BackendOptions;
use crate::config::schema::Config;

pub const HOST: &str = "LOGINSRV_HOST";
pub const PORT: &str = "LOGINSRV_PORT";
pub const LOG_LEVEL: &str = "LOGINSRV_LOG_LEVEL";
pub const TEXT_LOGGING: &str = "LOGINSRV_TEXT_LOGGING";
pub const JWT_SECRET: &str = "LOGINSRV_JWT_SECRET";
pub const SUCCESS_URL: &str = "LOGINSRV_SUCCESS_URL";
pub const COOKIE_NAME: &str = "LOGINSRV_COOKIE_NAME";
pub const COOKIE_HTTP_ONLY: &str = "LOGINSRV_COOKIE_HTTP_ONLY";
pub const LOGIN_PATH: &str = "LOGINSRV_LOGIN_PATH";
pub const BACKEND: &str = "LOGINSRV_BACKEND";

const NAMED_BACKEND_PREFIX: &str = "LOGINSRV_BACKEND_";

/// Ordered snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(String, String)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment. Variables whose name or
    /// value is not valid unicode are skipped. Order is whatever order the
    /// launcher placed the variables in, which a shell may have rearranged.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Set a variable. A name seen before keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.vars.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `name` if it is set and non-empty.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (name, value) in iter {
            env.set(name, value);
        }
        env
    }
}

/// Apply every scalar `LOGINSRV_*` variable that is set and non-empty.
pub fn apply_overrides(config: &mut Config, env: &Environment) -> Result<(), ConfigError> {
    let strings: [(&str, &mut String); 7] = [
        (HOST, &mut config.host),
        (PORT, &mut config.port),
        (LOG_LEVEL, &mut config.log_level),
        (JWT_SECRET, &mut config.jwt_secret),
        (SUCCESS_URL, &mut config.success_url),
        (COOKIE_NAME, &mut config.cookie_name),
        (LOGIN_PATH, &mut config.login_path),
    ];
    for (var, field) in strings {
        if let Some(value) = env.non_empty(var) {
            *field = value.to_string();
        }
    }

    let flags: [(&str, &str, &mut bool); 2] = [
        (TEXT_LOGGING, "text-logging", &mut config.text_logging),
        (COOKIE_HTTP_ONLY, "cookie-http-only", &mut config.cookie_http_only),
    ];
    for (var, option, field) in flags {
        if let Some(value) = env.non_empty(var) {
            *field = parse_bool(option, value).map_err(|e| e.in_env(var))?;
        }
    }

    Ok(())
}

/// Collect backend declarations from the environment.
///
/// `LOGINSRV_BACKEND` is appended first, then every `LOGINSRV_BACKEND_<NAME>`
/// in snapshot order. `<NAME>` must be non-empty and consist of uppercase
/// ASCII letters, digits and `_`; other variables are ignored. The first
/// declaration that fails to parse aborts the merge, annotated with its
/// variable name. No matching variables yields an empty list.
pub fn merge_backends(env: &Environment) -> Result<BackendOptions, ConfigError> {
    let mut backends = BackendOptions::new();

    if let Some(raw) = env.non_empty(BACKEND) {
        backends.set(raw).map_err(|e| e.in_env(BACKEND))?;
    }

    for (var, raw) in env.iter() {
        let Some(name) = var.strip_prefix(NAMED_BACKEND_PREFIX) else {
            continue;
        };
        if !is_backend_name(name) || raw.is_empty() {
            continue;
        }
        backends.set(raw).map_err(|e| e.in_env(var))?;
    }

    Ok(backends)
}

fn is_backend_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::BackendOption;

    #[test]
    fn test_empty_environment_has_no_backends() {
        let backends = merge_backends(&Environment::new()).unwrap();
        assert!(backends.is_empty());
    }

    #[test]
    fn test_generic_backend_comes_first() {
        let env: Environment = [
            ("LOGINSRV_BACKEND_FOO", "provider=foo"),
            ("LOGINSRV_BACKEND", "provider=simple,foo=bar"),
            ("LOGINSRV_BACKEND_BAR", "provider=bar"),
        ]
        .into_iter()
        .collect();

        let backends = merge_backends(&env).unwrap();
        assert_eq!(
            backends.value(),
            &[
                BackendOption::new("simple").with("foo", "bar"),
                BackendOption::new("foo"),
                BackendOption::new("bar"),
            ]
        );
    }

    #[test]
    fn test_named_backends_follow_snapshot_order() {
        let env: Environment = [
            ("LOGINSRV_BACKEND_ZED", "provider=zed"),
            ("PATH", "/usr/bin"),
            ("LOGINSRV_BACKEND_ALPHA", "provider=alpha"),
        ]
        .into_iter()
        .collect();

        let providers: Vec<_> = merge_backends(&env)
            .unwrap()
            .iter()
            .map(|b| b.provider().to_string())
            .collect();
        assert_eq!(providers, vec!["zed", "alpha"]);
    }

    #[test]
    fn test_ignores_unmatched_names_and_empty_values() {
        let env: Environment = [
            ("LOGINSRV_BACKEND_", "provider=nameless"),
            ("LOGINSRV_BACKEND_lower", "provider=lower"),
            ("LOGINSRV_BACKEND_EMPTY", ""),
            ("LOGINSRV_BACKENDS", "provider=plural"),
            ("LOGINSRV_BACKEND", ""),
            ("LOGINSRV_BACKEND_OK_2", "provider=ok"),
        ]
        .into_iter()
        .collect();

        let backends = merge_backends(&env).unwrap();
        assert_eq!(backends.value(), &[BackendOption::new("ok")]);
    }

    #[test]
    fn test_parse_failure_names_the_variable() {
        let env: Environment = [
            ("LOGINSRV_BACKEND", "provider=simple"),
            ("LOGINSRV_BACKEND_BROKEN", "name=nope"),
        ]
        .into_iter()
        .collect();

        match merge_backends(&env).unwrap_err() {
            ConfigError::EnvParse { var, source } => {
                assert_eq!(var, "LOGINSRV_BACKEND_BROKEN");
                assert!(matches!(*source, ConfigError::MissingProvider { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_skip_empty_values() {
        let mut config = Config::default();
        let env: Environment = [
            ("LOGINSRV_HOST", ""),
            ("LOGINSRV_PORT", "8080"),
            ("LOGINSRV_COOKIE_HTTP_ONLY", "false"),
        ]
        .into_iter()
        .collect();

        apply_overrides(&mut config, &env).unwrap();
        assert_eq!(config.host, Config::default().host);
        assert_eq!(config.port, "8080");
        assert!(!config.cookie_http_only);
    }

    #[test]
    fn test_invalid_bool_in_environment() {
        let mut config = Config::default();
        let env: Environment = [("LOGINSRV_TEXT_LOGGING", "yes")].into_iter().collect();

        match apply_overrides(&mut config, &env).unwrap_err() {
            ConfigError::EnvParse { var, source } => {
                assert_eq!(var, "LOGINSRV_TEXT_LOGGING");
                assert!(matches!(*source, ConfigError::InvalidBoolValue { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_later_duplicate_replaces_value_in_place() {
        let env: Environment = [("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        let names: Vec<_> = env.iter().collect();
        assert_eq!(names, vec![("A", "3"), ("B", "2")]);
    }
}
