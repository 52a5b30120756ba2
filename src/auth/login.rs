//! Login handler bound to the login path.
//!
//! # Responsibilities
//! - `POST` form credentials: try every backend in order, issue a token
//!   cookie and redirect to the success URL on the first match
//! - `?logout=true`: clear the token cookie and redirect to the login path
//! - Anything else: `401` with a short hint (no login form is rendered)

use std::sync::Arc;

use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::header::{HeaderValue, SET_COOKIE};
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Form;
use serde::Deserialize;

use crate::auth::cookie::{build_clear_cookie, build_token_cookie};
use crate::auth::token::{self, TokenCodec, UserInfo};
use crate::config::Config;
use crate::http::{see_other, HandlerResult, HttpHandler};
use crate::providers::{Authenticator, ProviderError, ProviderRegistry};

/// Lifetime of issued tokens and their cookie.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

pub struct LoginHandler {
    config: Arc<Config>,
    codec: TokenCodec,
    backends: Vec<Box<dyn Authenticator>>,
}

impl LoginHandler {
    /// Build the handler and every configured backend.
    pub fn new(config: Arc<Config>, registry: &ProviderRegistry) -> Result<Self, ProviderError> {
        let backends = registry.build_all(&config.backends)?;
        let codec = TokenCodec::new(&config.jwt_secret);
        Ok(Self {
            config,
            codec,
            backends,
        })
    }

    /// Try each backend in declaration order; the first match wins.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserInfo>, ProviderError> {
        for backend in &self.backends {
            if let Some(user) = backend.authenticate(username, password)? {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    fn login_succeeded(&self, mut user: UserInfo) -> HandlerResult {
        user.expiry = token::now() + TOKEN_TTL_SECS;
        let token = self.codec.issue(&user)?;
        let cookie = build_token_cookie(
            &self.config.cookie_name,
            &token,
            self.config.cookie_http_only,
            TOKEN_TTL_SECS,
        );

        tracing::info!(
            sub = %user.sub,
            origin = user.origin.as_deref().unwrap_or_default(),
            "Login succeeded"
        );

        let mut response = see_other(&self.config.success_url)?;
        response
            .headers_mut()
            .insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        Ok(response)
    }

    fn logout(&self) -> HandlerResult {
        let cookie = build_clear_cookie(&self.config.cookie_name, self.config.cookie_http_only);
        let mut response = see_other(&self.config.login_path)?;
        response
            .headers_mut()
            .insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        Ok(response)
    }
}

impl HttpHandler for LoginHandler {
    async fn serve(&self, request: Request<Body>) -> HandlerResult {
        if wants_logout(request.uri()) {
            return self.logout();
        }

        if request.method() != Method::POST {
            let hint = format!(
                "Login required: POST username and password to {}\n",
                self.config.login_path
            );
            return Ok((StatusCode::UNAUTHORIZED, hint).into_response());
        }

        let Form(credentials) = match Form::<Credentials>::from_request(request, &()).await {
            Ok(form) => form,
            Err(rejection) => return Ok(rejection.into_response()),
        };

        match self.authenticate(&credentials.username, &credentials.password)? {
            Some(user) => self.login_succeeded(user),
            None => {
                tracing::info!(username = %credentials.username, "Login failed");
                Ok((StatusCode::FORBIDDEN, "Invalid credentials\n").into_response())
            }
        }
    }
}

fn wants_logout(uri: &Uri) -> bool {
    uri.query()
        .map(|query| query.split('&').any(|pair| pair == "logout=true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendOption;
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::response::Response;

    /// Backend whose upstream is always down.
    struct Unreachable;

    impl Authenticator for Unreachable {
        fn provider(&self) -> &str {
            "unreachable"
        }

        fn authenticate(&self, _username: &str, _password: &str) -> Result<Option<UserInfo>, ProviderError> {
            Err(ProviderError::Unavailable {
                provider: "unreachable".into(),
                source: "connection refused".into(),
            })
        }
    }

    fn unreachable(_option: &BackendOption) -> Result<Box<dyn Authenticator>, ProviderError> {
        Ok(Box::new(Unreachable))
    }

    fn config() -> Config {
        Config {
            success_url: "/welcome".into(),
            backends: [
                BackendOption::new("simple").with("bob", "secret"),
                BackendOption::new("simple").with("alice", "wonderland"),
            ]
            .into_iter()
            .collect(),
            ..Config::default()
        }
    }

    fn handler(config: Config) -> LoginHandler {
        LoginHandler::new(Arc::new(config), &ProviderRegistry::with_builtin()).unwrap()
    }

    fn post(body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn set_cookie(response: &Response) -> &str {
        response.headers()[SET_COOKIE].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_successful_login_sets_cookie() {
        let handler = handler(config());
        let response = handler.serve(post("username=bob&password=secret")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/welcome");

        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("jwt_token="));
        assert!(cookie.contains("HttpOnly"));

        let token = cookie
            .strip_prefix("jwt_token=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        let user = TokenCodec::new(&Config::default().jwt_secret)
            .validate(token)
            .unwrap();
        assert_eq!(user.sub, "bob");
        assert_eq!(user.origin.as_deref(), Some("simple"));
    }

    #[tokio::test]
    async fn test_second_backend_is_tried() {
        let handler = handler(config());
        let response = handler
            .serve(post("username=alice&password=wonderland"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_wrong_password_is_forbidden() {
        let handler = handler(config());
        let response = handler.serve(post("username=bob&password=nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_cookie_http_only_is_configurable() {
        let handler = handler(Config {
            cookie_http_only: false,
            ..config()
        });
        let response = handler.serve(post("username=bob&password=secret")).await.unwrap();
        assert!(!set_cookie(&response).contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let handler = handler(config());
        let request = Request::builder()
            .uri("/login?logout=true")
            .body(Body::empty())
            .unwrap();

        let response = handler.serve(request).await.unwrap();
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(set_cookie(&response).contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_get_asks_for_credentials() {
        let handler = handler(config());
        let request = Request::builder().uri("/login").body(Body::empty()).unwrap();
        let response = handler.serve(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_an_error() {
        let mut registry = ProviderRegistry::with_builtin();
        registry.register("unreachable", unreachable);
        let config = Config {
            backends: [BackendOption::new("unreachable")].into_iter().collect(),
            ..config()
        };
        let handler = LoginHandler::new(Arc::new(config), &registry).unwrap();

        let err = handler
            .serve(post("username=bob&password=secret"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "provider unreachable failed");
    }

    #[tokio::test]
    async fn test_unusable_success_url_is_an_error() {
        let handler = handler(Config {
            success_url: "/welcome\r\n".into(),
            ..config()
        });
        let result = handler.serve(post("username=bob&password=secret")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_backends() {
        let result = LoginHandler::new(Arc::new(Config::default()), &ProviderRegistry::with_builtin());
        assert!(matches!(result, Err(ProviderError::NoBackends)));
    }

    #[test]
    fn test_wants_logout() {
        assert!(wants_logout(&"/login?logout=true".parse().unwrap()));
        assert!(wants_logout(&"/login?a=b&logout=true".parse().unwrap()));
        assert!(!wants_logout(&"/login?logout=false".parse().unwrap()));
        assert!(!wants_logout(&"/login".parse().unwrap()));
    }
}
