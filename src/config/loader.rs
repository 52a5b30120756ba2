//! Configuration resolution from defaults, environment and command line.

use std::ffi::OsString;

use clap::Parser;
use thiserror::Error;

use crate::config::env::{self, Environment};
use crate::config::options::BackendOptions;
use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

const BIN_NAME: &str = "loginsrv-gate";

/// Error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A backend option segment is not `key=value`.
    #[error("malformed backend option {segment:?}: expected key=value")]
    MalformedOption { segment: String },

    /// A backend option has no `provider` key. Only the keys are kept so
    /// credentials never end up in error messages.
    #[error("backend option has no provider (keys: {})", .keys.join(", "))]
    MissingProvider { keys: Vec<String> },

    /// Unknown flag, missing flag value, or a value of the wrong type.
    #[error("invalid command line: {0}")]
    InvalidFlagSyntax(#[from] clap::Error),

    #[error("invalid value {value:?} for {option}: expected \"true\" or \"false\"")]
    InvalidBoolValue { option: String, value: String },

    /// An error raised while reading the named environment variable.
    #[error("{var}: {source}")]
    EnvParse {
        var: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Annotate this error with the environment variable it came from.
    pub(crate) fn in_env(self, var: &str) -> Self {
        ConfigError::EnvParse {
            var: var.to_string(),
            source: Box::new(self),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse the literal `true` or `false`.
pub(crate) fn parse_bool(option: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBoolValue {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Command line flags. Every flag is optional; only flags that are passed
/// override the lower layers.
#[derive(Debug, Parser)]
#[command(name = BIN_NAME, version, about = "JWT cookie login gate", long_about = None)]
struct CliArgs {
    /// Host to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log human-readable text instead of JSON
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    text_logging: Option<String>,

    /// Secret used to sign and verify tokens
    #[arg(long)]
    jwt_secret: Option<String>,

    /// Redirect target after a successful login
    #[arg(long)]
    success_url: Option<String>,

    /// Name of the token cookie
    #[arg(long)]
    cookie_name: Option<String>,

    /// Mark the token cookie HttpOnly
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    cookie_http_only: Option<String>,

    /// Path served by the login handler
    #[arg(long)]
    login_path: Option<String>,

    /// Backend declaration `provider=<name>[,key=value...]`; repeatable
    #[arg(long = "backend", value_name = "OPTIONS")]
    backends: Vec<String>,
}

impl CliArgs {
    fn apply(self, config: &mut Config) -> Result<Vec<String>, ConfigError> {
        let strings = [
            (self.host, &mut config.host),
            (self.port, &mut config.port),
            (self.log_level, &mut config.log_level),
            (self.jwt_secret, &mut config.jwt_secret),
            (self.success_url, &mut config.success_url),
            (self.cookie_name, &mut config.cookie_name),
            (self.login_path, &mut config.login_path),
        ];
        for (value, field) in strings {
            if let Some(value) = value {
                *field = value;
            }
        }

        let flags = [
            (self.text_logging, "text-logging", &mut config.text_logging),
            (self.cookie_http_only, "cookie-http-only", &mut config.cookie_http_only),
        ];
        for (value, option, field) in flags {
            if let Some(value) = value {
                *field = parse_bool(option, &value)?;
            }
        }

        Ok(self.backends)
    }
}

/// Resolve the configuration.
///
/// Layers, lowest priority first: `defaults`, then `LOGINSRV_*` variables
/// from `env`, then `args` (flags only, without the program name).
///
/// Backends are all-or-nothing: any `--backend` flag replaces the
/// environment-derived list instead of extending it, and environment
/// backends replace the defaults' backends when at least one is declared.
pub fn resolve<I, T>(defaults: Config, args: I, env: &Environment) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = std::iter::once(OsString::from(BIN_NAME)).chain(args.into_iter().map(Into::into));
    let cli = CliArgs::try_parse_from(argv)?;

    let mut config = defaults;
    env::apply_overrides(&mut config, env)?;

    let cli_backends = cli.apply(&mut config)?;
    if cli_backends.is_empty() {
        let env_backends = env::merge_backends(env)?;
        if !env_backends.is_empty() {
            config.backends = env_backends;
        }
    } else {
        let mut backends = BackendOptions::new();
        for raw in &cli_backends {
            backends.set(raw)?;
        }
        config.backends = backends;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the configuration of this process from its arguments and
/// environment.
pub fn load_config() -> Result<Config, ConfigError> {
    resolve(
        Config::default(),
        std::env::args_os().skip(1),
        &Environment::capture(),
    )
}
