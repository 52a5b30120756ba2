//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic checks that flag parsing cannot express
//! - Keep values that end up in response headers header-safe
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::Config;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("jwt secret must not be empty")]
    EmptyJwtSecret,

    #[error("cookie name {0:?} is not a valid cookie token")]
    InvalidCookieName(String),

    #[error("login path {0:?} must start with '/' and contain only visible ASCII")]
    InvalidLoginPath(String),

    #[error("success url {0:?} must be non-empty visible ASCII")]
    InvalidSuccessUrl(String),
}

pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptyJwtSecret);
    }

    if !is_cookie_token(&config.cookie_name) {
        errors.push(ValidationError::InvalidCookieName(config.cookie_name.clone()));
    }

    if !config.login_path.starts_with('/') || !is_header_safe(&config.login_path) {
        errors.push(ValidationError::InvalidLoginPath(config.login_path.clone()));
    }

    if !is_header_safe(&config.success_url) {
        errors.push(ValidationError::InvalidSuccessUrl(config.success_url.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// RFC 6265 cookie-name: an RFC 2616 token.
fn is_cookie_token(name: &str) -> bool {
    const SEPARATORS: &str = "()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(c))
}

fn is_header_safe(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_graphic())
}
