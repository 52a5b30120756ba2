//! Configuration schema definitions.
//!
//! [`Config`] is resolved once at startup and then shared read-only.

use std::fmt;

use crate::config::options::BackendOptions;

/// Placeholder secret compiled into the defaults.
// WARNING: Replace via --jwt-secret or LOGINSRV_JWT_SECRET in production.
pub const DEFAULT_JWT_SECRET: &str = "random key";

/// Resolved configuration of the login gate.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to listen on.
    pub host: String,

    /// Port to listen on. Kept as a string so service names work too.
    pub port: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable logs instead of JSON.
    pub text_logging: bool,

    /// Secret used to sign and verify tokens.
    pub jwt_secret: String,

    /// Redirect target after a successful login.
    pub success_url: String,

    /// Name of the cookie carrying the token.
    pub cookie_name: String,

    /// Whether the issued cookie is marked HttpOnly.
    pub cookie_http_only: bool,

    /// Path handed to the login handler.
    pub login_path: String,

    /// Configured identity-provider backends, primary first.
    pub backends: BackendOptions,
}

impl Config {
    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True while the compiled-in placeholder secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "6789".to_string(),
            log_level: "info".to_string(),
            text_logging: false,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            success_url: "/".to_string(),
            cookie_name: "jwt_token".to_string(),
            cookie_http_only: true,
            login_path: "/login".to_string(),
            backends: BackendOptions::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("text_logging", &self.text_logging)
            .field("jwt_secret", &"<redacted>")
            .field("success_url", &self.success_url)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_http_only", &self.cookie_http_only)
            .field("login_path", &self.login_path)
            .field(
                "backends",
                &self.backends.iter().map(|b| b.provider()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::BackendOption;

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config {
            jwt_secret: "s3cret".into(),
            backends: [BackendOption::new("simple").with("bob", "hunter2")]
                .into_iter()
                .collect(),
            ..Config::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("simple"));
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(Config::default().bind_address(), "localhost:6789");
    }
}
