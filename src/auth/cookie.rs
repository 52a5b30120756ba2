//! Cookie helpers.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Find the value of cookie `name` across all `Cookie` headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Build a `Set-Cookie` value carrying `token`.
pub fn build_token_cookie(name: &str, token: &str, http_only: bool, max_age_secs: u64) -> String {
    let mut parts = vec![
        format!("{name}={token}"),
        "Path=/".to_string(),
        format!("Max-Age={max_age_secs}"),
        "SameSite=Lax".to_string(),
    ];
    if http_only {
        parts.push("HttpOnly".to_string());
    }
    parts.join("; ")
}

/// Build a `Set-Cookie` value that removes the token cookie.
pub fn build_clear_cookie(name: &str, http_only: bool) -> String {
    let mut parts = vec![
        format!("{name}="),
        "Path=/".to_string(),
        "Max-Age=0".to_string(),
        "Expires=Thu, 01 Jan 1970 00:00:00 GMT".to_string(),
    ];
    if http_only {
        parts.push("HttpOnly".to_string());
    }
    parts.join("; ")
}
